use bodycomp::config::AppConfig;
use bodycomp::export::{self, ExportFormat};
use bodycomp::import::DEMO_CSV;
use bodycomp::preferences::{GENDER_KEY, HEIGHT_KEY};
use bodycomp::{BodyCompError, CompositionReport, Engine, Gender, LogLevel, PreferenceStore, TimeRange, TomlPreferenceStore};
use std::fs;
use tempfile::tempdir;

/// Configuration and on-disk preference workflows as driven by the CLI

#[test]
fn test_config_points_engine_at_preference_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let prefs_path = dir.path().join("prefs").join("preferences.toml");

    let mut config = AppConfig::default();
    config.settings.preferences_path = Some(prefs_path.clone());
    config.settings.default_range = TimeRange::OneYear;
    config.save_to_file(&config_path).unwrap();

    let loaded = AppConfig::load_or_default(Some(&config_path)).unwrap();
    assert_eq!(loaded.preferences_path(), prefs_path);

    let store = TomlPreferenceStore::open(loaded.preferences_path()).unwrap();
    let mut engine = Engine::new(store);
    engine.set_gender(Gender::Female).unwrap();
    engine.set_height(Some(165.5)).unwrap();

    let content = fs::read_to_string(&prefs_path).unwrap();
    assert!(content.contains("[preferences]"));
    assert!(content.contains("female"));

    let reopened = TomlPreferenceStore::open(&prefs_path).unwrap();
    assert_eq!(reopened.get(GENDER_KEY).as_deref(), Some("female"));
    assert_eq!(reopened.get(HEIGHT_KEY).as_deref(), Some("165.5"));

    let engine = Engine::new(reopened);
    assert_eq!(engine.profile().height_cm, Some(165.5));
}

#[test]
fn test_hand_written_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[metadata]
version = "1.0"
created_at = "2025-01-01T00:00:00Z"
updated_at = "2025-01-01T00:00:00Z"

[settings]
default_range = "2023"

[logging]
level = "info"
format = "json"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_file(&config_path).unwrap();
    assert_eq!(config.settings.default_range, TimeRange::Year(2023));
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.settings.preferences_path.is_none());
}

#[test]
fn test_unwritable_preference_file_keeps_session_profile() {
    let dir = tempdir().unwrap();
    // A regular file where the parent directory should be makes every write fail
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let store = TomlPreferenceStore::open(blocker.join("preferences.toml")).unwrap();

    let mut engine = Engine::new(store);
    let err = engine.set_gender(Gender::Female).unwrap_err();
    assert_eq!(engine.profile().gender, Gender::Female);
    assert!(BodyCompError::from(err).user_message().contains("this session only"));
}

#[test]
fn test_report_written_to_disk() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::new(TomlPreferenceStore::open(dir.path().join("p.toml")).unwrap());
    engine.ingest(DEMO_CSV);
    engine.set_time_range(TimeRange::Year(2023));

    let report = CompositionReport::generate(&engine.view());
    let text_path = dir.path().join("report.txt");
    export::export_report(&report, ExportFormat::Text, &text_path).unwrap();

    let content = fs::read_to_string(&text_path).unwrap();
    assert!(content.contains("BODY COMPOSITION REPORT"));
    assert!(content.contains("2023/01/10"));
}
