use crate::lens::geometry::{ScreenPoint, ScreenRect};
use crate::lens::input::{KeyEvent, MouseEvent};
use crate::lens::region::EllipseRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnifierEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Hotkey,
    /// The OS move-loop relocated the host window.
    Moved { position: ScreenPoint },
    Tick { cursor: Option<ScreenPoint> },
    CloseRequested,
}

/// Side effects the runtime hands to the OS layer, in emission order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    SetZoomTransform { factor: f32 },
    SetHostBounds { bounds: ScreenRect },
    MoveHost { position: ScreenPoint },
    SetHostClip { clip: EllipseRegion },
    SetDisplayBounds { bounds: ScreenRect },
    SetDisplayClip { clip: Option<EllipseRegion> },
    SetSourceRect { rect: ScreenRect },
    AssertTopmost,
    RepaintBorder,
    SetCursorVisible { visible: bool },
    SetClickThrough { enabled: bool },
    BeginDrag,
    SetMinimized { minimized: bool },
    Exit { code: i32 },
}
