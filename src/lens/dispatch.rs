use crate::lens::geometry::MagnifierState;
use crate::lens::input::{map_key_event_to_command, map_mouse_event_to_command, Command};
use crate::lens::messages::{Effect, MagnifierEvent};
use crate::lens::region::size_effects;
use crate::lens::source::{source_effects, tick_effects};

pub const EXIT_CODE_OK: i32 = 0;

/// Applies one event to the state and returns the OS effects it implies.
pub fn dispatch(state: &mut MagnifierState, event: MagnifierEvent) -> Vec<Effect> {
    match event {
        MagnifierEvent::Key(key) => match map_key_event_to_command(key) {
            Some(command) => apply_command(state, command),
            None => Vec::new(),
        },
        MagnifierEvent::Mouse(mouse) => apply_command(state, map_mouse_event_to_command(mouse)),
        MagnifierEvent::Hotkey => apply_command(state, Command::ToggleMinimized),
        MagnifierEvent::Moved { position } => {
            if position == state.position {
                return Vec::new();
            }
            state.position = position;
            source_effects(state)
        }
        MagnifierEvent::Tick { cursor } => tick_effects(state, cursor),
        MagnifierEvent::CloseRequested => apply_command(state, Command::Exit),
    }
}

pub fn apply_command(state: &mut MagnifierState, command: Command) -> Vec<Effect> {
    tracing::debug!(?command, "applying lens command");
    match command {
        Command::Exit => vec![Effect::Exit { code: EXIT_CODE_OK }],
        Command::ZoomIn => {
            state.zoom_in();
            zoom_effects(state)
        }
        Command::ZoomOut => {
            state.zoom_out();
            zoom_effects(state)
        }
        Command::ResetZoom => {
            state.reset_zoom();
            zoom_effects(state)
        }
        Command::Enlarge => {
            state.grow_diameter();
            size_effects(state)
        }
        Command::Shrink => {
            state.shrink_diameter();
            size_effects(state)
        }
        Command::ResetDiameter => {
            state.reset_diameter();
            size_effects(state)
        }
        Command::ToggleCursor => {
            state.show_cursor = !state.show_cursor;
            vec![Effect::SetCursorVisible {
                visible: state.show_cursor,
            }]
        }
        Command::ToggleBorder => {
            state.show_border = !state.show_border;
            // The display inset depends on the border, so the whole block is redone.
            size_effects(state)
        }
        Command::ToggleFollow => {
            state.follow_cursor = !state.follow_cursor;
            vec![Effect::SetClickThrough {
                enabled: state.follow_cursor,
            }]
        }
        Command::BeginDrag => vec![Effect::BeginDrag],
        Command::ToggleMinimized => {
            state.minimized = !state.minimized;
            vec![Effect::SetMinimized {
                minimized: state.minimized,
            }]
        }
    }
}

fn zoom_effects(state: &MagnifierState) -> Vec<Effect> {
    let mut effects = vec![Effect::SetZoomTransform {
        factor: state.zoom(),
    }];
    effects.extend(source_effects(state));
    effects
}

/// Effects that bring a freshly created window in line with `state`.
pub fn initial_effects(state: &mut MagnifierState) -> Vec<Effect> {
    let mut effects = vec![
        Effect::SetZoomTransform {
            factor: state.zoom(),
        },
        Effect::SetCursorVisible {
            visible: state.show_cursor,
        },
        Effect::SetClickThrough {
            enabled: state.follow_cursor,
        },
    ];
    effects.extend(size_effects(state));
    effects
}
