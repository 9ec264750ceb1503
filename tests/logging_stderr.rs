use std::{thread::sleep, time::Duration};

use tempfile::tempdir;
use tracing::Level;

// Separate test binary: the global subscriber installed here must not be the
// file-backed one from `tests/logging.rs`.
#[test]
fn init_without_file_creates_no_log_and_stays_at_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("magnifier.log");
    std::env::set_var("RUST_LOG", "trace");

    magnifier::logging::init(false, None);
    tracing::info!("lens started");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
    assert!(tracing::enabled!(Level::INFO));
    assert!(!tracing::enabled!(Level::DEBUG), "RUST_LOG must not raise the level");
}
