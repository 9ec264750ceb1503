use crate::lens::geometry::{MagnifierState, ScreenRect};
use crate::lens::messages::Effect;
use crate::lens::source::source_effects;

/// Elliptic clip region in window-local coordinates, `right`/`bottom`
/// exclusive, matching what the window system expects for a circular mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EllipseRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl EllipseRegion {
    pub fn circle(inset: i32, diameter: i32) -> Self {
        Self {
            left: inset,
            top: inset,
            right: diameter - inset,
            bottom: diameter - inset,
        }
    }
}

/// Everything the host window and display surface need for one diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLayout {
    pub host_bounds: ScreenRect,
    pub host_clip: EllipseRegion,
    /// Display surface bounds relative to the host client area.
    pub display_bounds: ScreenRect,
    pub display_clip: Option<EllipseRegion>,
}

/// Border inset that still leaves a visible display surface.
pub fn effective_inset(diameter: i32, border_width: i32) -> i32 {
    border_width.clamp(0, (diameter / 2 - 1).max(0))
}

pub fn compute_layout(state: &MagnifierState) -> SizeLayout {
    let diameter = state.diameter();
    let host_bounds = state.host_bounds();
    let host_clip = EllipseRegion::circle(0, diameter);

    let inset = if state.show_border {
        effective_inset(diameter, state.border_width())
    } else {
        0
    };

    if inset == 0 {
        return SizeLayout {
            host_bounds,
            host_clip,
            display_bounds: ScreenRect::new(0, 0, diameter, diameter),
            display_clip: None,
        };
    }

    let inner = diameter - 2 * inset;
    SizeLayout {
        host_bounds,
        host_clip,
        display_bounds: ScreenRect::new(inset, inset, inner, inner),
        // The display surface clips in its own coordinates.
        display_clip: Some(EllipseRegion::circle(0, inner)),
    }
}

/// Re-clamps the diameter and produces the full resize block: host bounds,
/// host clip, display surface bounds and clip, the source block, and a
/// border repaint, in that order.
pub fn size_effects(state: &mut MagnifierState) -> Vec<Effect> {
    let diameter = state.set_diameter(state.diameter());
    let layout = compute_layout(state);
    tracing::debug!(diameter, ?layout, "recomputed lens layout");

    let mut effects = vec![
        Effect::SetHostBounds {
            bounds: layout.host_bounds,
        },
        Effect::SetHostClip {
            clip: layout.host_clip,
        },
        Effect::SetDisplayBounds {
            bounds: layout.display_bounds,
        },
        Effect::SetDisplayClip {
            clip: layout.display_clip,
        },
    ];
    effects.extend(source_effects(state));
    effects.push(Effect::RepaintBorder);
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::geometry::{ScreenMetrics, ScreenPoint};

    fn state() -> MagnifierState {
        MagnifierState::new(ScreenMetrics::new(1920, 1080), 4)
    }

    #[test]
    fn bordered_layout_insets_display_surface() {
        let mut state = state();
        state.position = ScreenPoint::new(100, 50);
        let layout = compute_layout(&state);

        assert_eq!(layout.host_bounds, ScreenRect::new(100, 50, 270, 270));
        assert_eq!(layout.host_clip, EllipseRegion::circle(0, 270));
        assert_eq!(layout.display_bounds, ScreenRect::new(4, 4, 262, 262));
        assert_eq!(layout.display_clip, Some(EllipseRegion::circle(0, 262)));
    }

    #[test]
    fn borderless_layout_fills_host() {
        let mut state = state();
        state.show_border = false;
        let layout = compute_layout(&state);

        assert_eq!(layout.display_bounds, ScreenRect::new(0, 0, 270, 270));
        assert_eq!(layout.display_clip, None);
    }

    #[test]
    fn oversized_border_never_swallows_display() {
        assert_eq!(effective_inset(10, 40), 4);
        assert_eq!(effective_inset(1, 40), 0);
        assert_eq!(effective_inset(270, -3), 0);
    }

    #[test]
    fn size_effects_are_ordered_and_end_with_repaint() {
        let mut state = state();
        state.grow_diameter();
        let effects = size_effects(&mut state);

        assert!(matches!(
            effects[0],
            Effect::SetHostBounds { bounds } if bounds.width == 405 && bounds.height == 405
        ));
        assert!(matches!(effects[1], Effect::SetHostClip { clip } if clip == EllipseRegion::circle(0, 405)));
        assert!(matches!(effects[2], Effect::SetDisplayBounds { .. }));
        assert!(matches!(effects[3], Effect::SetDisplayClip { .. }));
        assert!(matches!(effects[4], Effect::SetSourceRect { .. }));
        assert_eq!(effects[5], Effect::AssertTopmost);
        assert_eq!(effects.last(), Some(&Effect::RepaintBorder));
    }

    #[test]
    fn resize_keeps_top_left() {
        let mut state = state();
        state.position = ScreenPoint::new(300, 200);
        state.grow_diameter();
        let effects = size_effects(&mut state);
        assert_eq!(
            effects[0],
            Effect::SetHostBounds {
                bounds: ScreenRect::new(300, 200, 405, 405)
            }
        );
    }
}
