use magnifier::hotkey::Hotkey;
use magnifier::lens::runtime::MagnifierRuntime;
use magnifier::settings::Settings;
use std::time::Duration;

use mock_backend::{Call, RecordingBackend};

#[test]
fn defaults_match_the_built_in_lens() {
    let settings = Settings::default();
    assert_eq!(settings.tick_interval(), Duration::from_millis(16));
    assert_eq!(settings.border_width, 4);
    assert_eq!(settings.border_color, [255, 128, 0]);
    assert_eq!(settings.hotkey(), Hotkey::default());
    assert!(!settings.debug_logging);
    assert!(settings.log_file.is_none());
}

#[test]
fn default_settings_are_already_in_range() {
    let mut settings = Settings::default();
    assert!(!settings.sanitize());
    assert_eq!(settings, Settings::default());
}

#[test]
fn sanitized_tick_interval_reaches_the_scheduler() {
    let mut settings = Settings {
        tick_interval_ms: 5_000,
        ..Settings::default()
    };
    settings.sanitize();

    let mut runtime = MagnifierRuntime::new(RecordingBackend::new(), &settings);
    runtime.start().unwrap();
    assert_eq!(
        runtime.backend().calls.last(),
        Some(&Call::StartTick(Duration::from_millis(1000)))
    );
}

#[test]
fn partial_document_keeps_other_defaults() {
    let settings: Settings =
        serde_json::from_str(r#"{ "tick_interval_ms": 33, "toggle_hotkey": "Ctrl+Shift+L" }"#)
            .unwrap();
    assert_eq!(settings.tick_interval(), Duration::from_millis(33));
    assert_eq!(settings.border_width, 4);
    assert_eq!(settings.hotkey().to_string(), "Ctrl+Shift+L");
}
