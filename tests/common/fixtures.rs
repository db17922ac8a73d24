use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use trainreel::config::Config;

pub fn config_with_idle_timeout(idle_timeout_ms: u64) -> Config {
    let mut config = Config::default();
    config.controls.idle_timeout_ms = idle_timeout_ms;
    config
}

/// Write `contents` as a config file inside a fresh temp dir.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config file");
    (temp_dir, path)
}
