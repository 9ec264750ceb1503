#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use magnifier::lens::platform;
use magnifier::logging;
use magnifier::settings::Settings;

fn main() {
    let mut settings = Settings::default();
    settings.sanitize();
    logging::init(settings.debug_logging, settings.log_file.clone());

    let code = match platform::run(&settings) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = ?err, "magnifier failed to start");
            eprintln!("magnifier: {err:#}");
            1
        }
    };
    logging::flush();
    std::process::exit(code);
}
