//! Environment overrides on top of the configuration file
//!
//! Kept in its own test binary: it changes process environment.

use ahfm_console::config::AppConfig;
use std::io::Write;

#[test]
fn environment_overrides_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(b"[engine]\nprepare_delay_ms = 25\n").unwrap();

    std::env::set_var("AHFM_ENGINE__PREPARE_DELAY_MS", "5");
    std::env::set_var("AHFM_PLAYBACK__STREAM_ADDRESS", "https://backup.ah.fm/stream");

    let config = AppConfig::load(Some(file.path())).unwrap();

    std::env::remove_var("AHFM_ENGINE__PREPARE_DELAY_MS");
    std::env::remove_var("AHFM_PLAYBACK__STREAM_ADDRESS");

    assert_eq!(config.engine.prepare_delay_ms, 5);
    assert_eq!(config.playback.stream_address, "https://backup.ah.fm/stream");
}
