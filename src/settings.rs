use crate::hotkey::{parse_hotkey, Hotkey};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const TICK_INTERVAL_RANGE_MS: (u64, u64) = (1, 1000);
const BORDER_WIDTH_RANGE: (i32, i32) = (0, 32);

/// Startup tunables. Built from defaults in code; never read from or written
/// to disk.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Refresh period of the lens. Defaults to 16ms, close to a 60Hz display.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Width of the ring drawn around the display surface when the border is shown.
    #[serde(default = "default_border_width")]
    pub border_width: i32,
    #[serde(default = "default_border_color")]
    pub border_color: [u8; 3],
    /// Global minimize/restore hotkey, e.g. `"Ctrl+Alt+M"`.
    #[serde(default = "default_toggle_hotkey")]
    pub toggle_hotkey: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_tick_interval_ms() -> u64 {
    16
}

fn default_border_width() -> i32 {
    4
}

fn default_border_color() -> [u8; 3] {
    [255, 128, 0]
}

fn default_toggle_hotkey() -> String {
    "Ctrl+Alt+M".to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            border_width: default_border_width(),
            border_color: default_border_color(),
            toggle_hotkey: default_toggle_hotkey(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    /// Pulls out-of-range values back into range. Returns `true` when
    /// anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        let tick = self
            .tick_interval_ms
            .clamp(TICK_INTERVAL_RANGE_MS.0, TICK_INTERVAL_RANGE_MS.1);
        if tick != self.tick_interval_ms {
            tracing::warn!(
                configured = self.tick_interval_ms,
                used = tick,
                "tick interval out of range"
            );
            self.tick_interval_ms = tick;
            changed = true;
        }

        let border = self
            .border_width
            .clamp(BORDER_WIDTH_RANGE.0, BORDER_WIDTH_RANGE.1);
        if border != self.border_width {
            tracing::warn!(
                configured = self.border_width,
                used = border,
                "border width out of range"
            );
            self.border_width = border;
            changed = true;
        }

        changed
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn hotkey(&self) -> Hotkey {
        match parse_hotkey(&self.toggle_hotkey) {
            Some(k) => k,
            None => {
                tracing::warn!(
                    "provided hotkey string '{}' is invalid; using default {}",
                    self.toggle_hotkey,
                    default_toggle_hotkey()
                );
                Hotkey::default()
            }
        }
    }
}
