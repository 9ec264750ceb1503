#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    /// `+` on the main keyboard or the numpad.
    Plus,
    /// `-` on the main keyboard or the numpad.
    Minus,
    /// `0` on the main keyboard or the numpad.
    Zero,
    C,
    B,
    F,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn shifted(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: KeyModifiers {
                shift: true,
                ..KeyModifiers::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    LeftDown,
    LeftDoubleClick,
    RightDoubleClick,
    MiddleClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Enlarge,
    Shrink,
    ResetDiameter,
    ToggleCursor,
    ToggleBorder,
    ToggleFollow,
    BeginDrag,
    ToggleMinimized,
}

const VK_ESCAPE: u32 = 0x1B;
const VK_0: u32 = 0x30;
const VK_B: u32 = 0x42;
const VK_C: u32 = 0x43;
const VK_F: u32 = 0x46;
const VK_NUMPAD0: u32 = 0x60;
const VK_ADD: u32 = 0x6B;
const VK_SUBTRACT: u32 = 0x6D;
const VK_OEM_PLUS: u32 = 0xBB;
const VK_OEM_MINUS: u32 = 0xBD;

/// Folds numpad and main-keyboard variants of the same key together.
pub fn key_code_from_virtual_key(vk: u32) -> KeyCode {
    match vk {
        VK_ESCAPE => KeyCode::Escape,
        VK_OEM_PLUS | VK_ADD => KeyCode::Plus,
        VK_OEM_MINUS | VK_SUBTRACT => KeyCode::Minus,
        VK_0 | VK_NUMPAD0 => KeyCode::Zero,
        VK_C => KeyCode::C,
        VK_B => KeyCode::B,
        VK_F => KeyCode::F,
        _ => KeyCode::Other,
    }
}

pub fn map_key_event_to_command(event: KeyEvent) -> Option<Command> {
    let zoom_chord = event.modifiers.shift;
    match (event.key, zoom_chord) {
        (KeyCode::Escape, _) => Some(Command::Exit),
        (KeyCode::Plus, true) => Some(Command::ZoomIn),
        (KeyCode::Plus, false) => Some(Command::Enlarge),
        (KeyCode::Minus, true) => Some(Command::ZoomOut),
        (KeyCode::Minus, false) => Some(Command::Shrink),
        (KeyCode::Zero, true) => Some(Command::ResetZoom),
        (KeyCode::Zero, false) => Some(Command::ResetDiameter),
        (KeyCode::C, _) => Some(Command::ToggleCursor),
        (KeyCode::B, _) => Some(Command::ToggleBorder),
        (KeyCode::F, _) => Some(Command::ToggleFollow),
        (KeyCode::Other, _) => None,
    }
}

pub fn map_mouse_event_to_command(event: MouseEvent) -> Command {
    match event {
        MouseEvent::LeftDown => Command::BeginDrag,
        MouseEvent::LeftDoubleClick => Command::ToggleCursor,
        MouseEvent::RightDoubleClick => Command::Exit,
        MouseEvent::MiddleClick => Command::ToggleFollow,
    }
}
