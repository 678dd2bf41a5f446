use std::fs;

use hogar_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_the_household_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.household_id, "hogar-principal");
    assert_eq!(cfg.currency_symbol, "L");
    assert_eq!(cfg.recent_expense_limit, 60);
    assert_eq!(cfg.aggregation_expense_limit, 1000);
    assert!(cfg.current_period.is_none());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("load config"), Config::default());
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
    assert_eq!(manager.data_dir(&Config::default()), dir.path().join("data"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.household_id = "casa-lopez".to_string();
    cfg.currency_symbol = "$".to_string();
    cfg.data_root = Some(dir.path().join("elsewhere"));

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(manager.data_dir(&loaded), dir.path().join("elsewhere"));
    assert!(!dir.path().join("config").join("config.json.tmp").exists());
}

#[test]
fn record_current_period_keeps_other_fields() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    let mut cfg = Config::default();
    cfg.currency_symbol = "€".to_string();
    manager.save(&cfg).expect("save config");

    let updated = manager
        .record_current_period(Some("2024-07".to_string()))
        .expect("record period");
    assert_eq!(updated.current_period.as_deref(), Some("2024-07"));
    assert_eq!(updated.currency_symbol, "€");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.current_period.as_deref(), Some("2024-07"));

    let cleared = manager.record_current_period(None).expect("clear period");
    assert!(cleared.current_period.is_none());
}

#[test]
fn partial_files_fill_in_defaults_and_bad_values_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    fs::write(manager.config_path(), r#"{"current_period": "2024-02"}"#).unwrap();
    let loaded = manager.load().expect("load partial config");
    assert_eq!(loaded.current_period.as_deref(), Some("2024-02"));
    assert_eq!(loaded.household_id, "hogar-principal");

    fs::write(manager.config_path(), r#"{"aggregation_expense_limit": 0}"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));

    fs::write(manager.config_path(), "not json").unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}
