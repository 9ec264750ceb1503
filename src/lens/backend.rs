use crate::lens::geometry::{ScreenMetrics, ScreenPoint, ScreenRect};
use crate::lens::region::EllipseRegion;
use anyhow::Result;
use std::time::Duration;

/// The external capability that captures a screen region and scales it into
/// the display surface.
pub trait Magnification {
    fn initialize(&mut self) -> Result<()>;
    fn set_zoom_transform(&mut self, factor: f32) -> Result<()>;
    fn set_source_region(&mut self, rect: ScreenRect) -> Result<()>;
    fn teardown(&mut self);
}

/// Host window plus its child display surface.
pub trait HostWindow {
    fn screen_metrics(&self) -> ScreenMetrics;
    fn create(&mut self, bounds: ScreenRect) -> Result<()>;
    fn destroy(&mut self);
    fn show(&mut self);
    fn set_bounds(&mut self, bounds: ScreenRect) -> Result<()>;
    fn move_to(&mut self, position: ScreenPoint) -> Result<()>;
    fn set_clip(&mut self, clip: EllipseRegion) -> Result<()>;
    fn set_display_bounds(&mut self, bounds: ScreenRect) -> Result<()>;
    fn set_display_clip(&mut self, clip: Option<EllipseRegion>) -> Result<()>;
    fn assert_topmost(&mut self) -> Result<()>;
    fn request_repaint(&mut self);
    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;
    fn set_click_through(&mut self, enabled: bool) -> Result<()>;
    fn begin_drag(&mut self);
    fn set_minimized(&mut self, minimized: bool);
}

/// Periodic refresh source. Deliveries must be serialized with input events.
pub trait TickScheduler {
    fn start(&mut self, period: Duration) -> Result<()>;
    fn stop(&mut self);
}

/// Row-major 3x3 homogeneous scale matrix for a uniform zoom.
pub fn zoom_matrix(factor: f32) -> [f32; 9] {
    [factor, 0.0, 0.0, 0.0, factor, 0.0, 0.0, 0.0, 1.0]
}

/// Region to hand the capability when the display surface sits `inset`
/// pixels inside the host. The surface shows `rect` from its own origin, so
/// the origin moves by `inset / zoom` to keep the visible area centred on
/// the host. The size is unchanged.
pub fn inset_source_region(rect: ScreenRect, inset: i32, zoom: f32) -> ScreenRect {
    let shift = (inset as f32 / zoom) as i32;
    ScreenRect::new(rect.x + shift, rect.y + shift, rect.width, rect.height)
}

pub trait Backend: Magnification + HostWindow + TickScheduler {}

impl<T: Magnification + HostWindow + TickScheduler> Backend for T {}
