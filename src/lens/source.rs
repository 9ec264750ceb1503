use crate::lens::geometry::{MagnifierState, ScreenPoint, ScreenRect};
use crate::lens::messages::Effect;

/// Screen region captured for a host client area of `client_width` x
/// `client_height` at `zoom`, centred on `center`. Sizes truncate toward zero.
pub fn source_rect_for(
    center: ScreenPoint,
    client_width: i32,
    client_height: i32,
    zoom: f32,
) -> ScreenRect {
    let width = (client_width as f32 / zoom) as i32;
    let height = (client_height as f32 / zoom) as i32;
    ScreenRect::centered_on(center, width, height)
}

pub fn source_rect(state: &MagnifierState) -> ScreenRect {
    let host = state.host_bounds();
    source_rect_for(host.center(), host.width, host.height, state.zoom())
}

/// Host top-left that puts the lens centre on `cursor`. The centre is kept
/// on screen; the window itself may hang off an edge by up to half its size.
pub fn follow_position(state: &MagnifierState, cursor: ScreenPoint) -> ScreenPoint {
    let center = state.screen().clamp_point(cursor);
    let half = state.diameter() / 2;
    ScreenPoint::new(center.x - half, center.y - half)
}

pub fn source_effects(state: &MagnifierState) -> Vec<Effect> {
    vec![
        Effect::SetSourceRect {
            rect: source_rect(state),
        },
        Effect::AssertTopmost,
    ]
}

/// Per-tick work: relocate under the cursor when following, then recompute
/// the source rectangle and reclaim topmost.
///
/// The move is issued on every follow tick, even when the target equals the
/// recorded position, so a relocation the OS dropped is retried next tick.
pub fn tick_effects(state: &mut MagnifierState, cursor: Option<ScreenPoint>) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);
    if state.follow_cursor {
        if let Some(cursor) = cursor {
            let position = follow_position(state, cursor);
            state.position = position;
            effects.push(Effect::MoveHost { position });
        }
    }
    effects.extend(source_effects(state));
    effects
}
