#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use hogar::{AppSettings, HouseholdApp, PeriodSession, PeriodStorage};
use hogar_config::ConfigManager;
use hogar_core::{Clock, DocumentStore, FixedClock};
use hogar_storage_json::JsonDocumentStore;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
}

/// Creates a config manager rooted in a fresh temporary directory.
pub fn temp_manager() -> ConfigManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    ConfigManager::with_base_dir(base).expect("create config manager for temp dir")
}

/// Opens an app over JSON storage in `manager`'s data directory with a frozen clock.
pub fn open_app(manager: &ConfigManager) -> HouseholdApp {
    let config = manager.load().expect("load config");
    let backend: Arc<dyn DocumentStore> = Arc::new(
        JsonDocumentStore::new(manager.data_dir(&config)).expect("create json store"),
    );
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(frozen_now()));
    let storage: Arc<dyn PeriodStorage> = Arc::new(manager.clone());
    let session = PeriodSession::load(storage, clock.clone()).expect("load session");
    HouseholdApp::new(
        backend,
        &config.household_id,
        clock,
        session,
        AppSettings::from(&config),
    )
}

/// Creates an isolated app and the manager backing its configuration.
pub fn setup_test_env() -> (HouseholdApp, ConfigManager) {
    let manager = temp_manager();
    (open_app(&manager), manager)
}
