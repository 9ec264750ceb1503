pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 10.0;
pub const DEFAULT_ZOOM: f32 = MIN_ZOOM;
pub const ZOOM_STEP: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Rectangle of the given size whose [`ScreenRect::center`] is `center`.
    pub fn centered_on(center: ScreenPoint, width: i32, height: i32) -> Self {
        Self::new(center.x - width / 2, center.y - height / 2, width, height)
    }
}

/// Dimensions of the screen the lens lives on. Diameter bounds derive from
/// the height alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMetrics {
    pub width: i32,
    pub height: i32,
}

impl ScreenMetrics {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn min_diameter(&self) -> i32 {
        self.height / 4
    }

    pub fn max_diameter(&self) -> i32 {
        self.height
    }

    pub fn diameter_step(&self) -> i32 {
        self.height / 8
    }

    pub fn default_diameter(&self) -> i32 {
        self.min_diameter()
    }

    pub fn clamp_diameter(&self, diameter: i32) -> i32 {
        diameter.clamp(self.min_diameter(), self.max_diameter().max(self.min_diameter()))
    }

    /// Nearest point inside the screen, used to keep the follow-mode centre
    /// from drifting away when the cursor is reported off the primary screen.
    pub fn clamp_point(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            point.x.clamp(0, (self.width - 1).max(0)),
            point.y.clamp(0, (self.height - 1).max(0)),
        )
    }
}

pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// The single authoritative record of the lens geometry and display flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnifierState {
    screen: ScreenMetrics,
    diameter: i32,
    zoom: f32,
    border_width: i32,
    pub show_cursor: bool,
    pub show_border: bool,
    pub follow_cursor: bool,
    pub minimized: bool,
    pub position: ScreenPoint,
}

impl MagnifierState {
    pub fn new(screen: ScreenMetrics, border_width: i32) -> Self {
        Self {
            screen,
            diameter: screen.default_diameter(),
            zoom: DEFAULT_ZOOM,
            border_width: border_width.max(0),
            show_cursor: true,
            show_border: true,
            follow_cursor: false,
            minimized: false,
            position: ScreenPoint::default(),
        }
    }

    pub fn screen(&self) -> ScreenMetrics {
        self.screen
    }

    pub fn diameter(&self) -> i32 {
        self.diameter
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn border_width(&self) -> i32 {
        self.border_width
    }

    pub fn set_diameter(&mut self, diameter: i32) -> i32 {
        self.diameter = self.screen.clamp_diameter(diameter);
        self.diameter
    }

    pub fn grow_diameter(&mut self) -> i32 {
        self.set_diameter(self.diameter.saturating_add(self.screen.diameter_step()))
    }

    pub fn shrink_diameter(&mut self) -> i32 {
        self.set_diameter(self.diameter.saturating_sub(self.screen.diameter_step()))
    }

    pub fn reset_diameter(&mut self) -> i32 {
        self.set_diameter(self.screen.default_diameter())
    }

    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.zoom = clamp_zoom(zoom);
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    pub fn reset_zoom(&mut self) -> f32 {
        self.set_zoom(DEFAULT_ZOOM)
    }

    /// Outer bounds of the host window in screen coordinates.
    pub fn host_bounds(&self) -> ScreenRect {
        ScreenRect::new(self.position.x, self.position.y, self.diameter, self.diameter)
    }
}
