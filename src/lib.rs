pub mod hotkey;
pub mod lens;
pub mod logging;
pub mod settings;
