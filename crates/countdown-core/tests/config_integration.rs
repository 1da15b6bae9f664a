//! Integration tests for configuration files on disk.

use countdown_core::{Config, ConfigError, PitchRamp, TimerEngine, Sinks};
use tempfile::TempDir;

#[test]
fn test_missing_file_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let cfg = Config::load_from(&path).unwrap();
    assert_eq!(cfg, Config::default());
    assert!(path.exists());

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[timer]"));
    assert!(content.contains("duration_secs = 90.0"));
}

#[test]
fn test_save_and_reload_preserves_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut cfg = Config::default();
    cfg.set_value("timer.duration_secs", "120").unwrap();
    cfg.set_value("pitch.ramp", "linear").unwrap();
    cfg.set_value("display.bell", "false").unwrap();
    cfg.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.timer.duration_secs, 120.0);
    assert_eq!(reloaded.pitch.ramp, PitchRamp::Linear);
    assert!(!reloaded.display.bell);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "[timer\nduration_secs = ").unwrap();
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::LoadFailed { .. })
    ));

    std::fs::write(&path, "[timer]\nduration_secs = 5000.0\n").unwrap();
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_config_drives_engine_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[timer]\nduration_secs = 30.0\nwarn_window_secs = 30.0\n\n[pitch]\nmax_pitch = 2.0\n",
    )
    .unwrap();

    let cfg = Config::load_from(&path).unwrap();
    let mut engine = TimerEngine::new(cfg.timer_settings(), Sinks::null());
    assert_eq!(engine.duration_secs(), 30.0);
    assert_eq!(engine.pitch_onset_fraction(), 0.0);

    engine.advance();
    engine.tick(15.0);
    assert!((engine.pitch() - 1.5).abs() < 1e-12);
}
