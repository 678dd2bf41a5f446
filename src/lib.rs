#![doc(test(attr(deny(warnings))))]

//! Hogar keeps the shared finances and chores of a two-person household:
//! monthly income, category budgets, expenses, period closure with rollover,
//! proportional settlement, and a task ledger.
//!
//! The member crates hold the domain types (`hogar-domain`), the services
//! (`hogar-core`), a JSON file store (`hogar-storage-json`) and client
//! configuration (`hogar-config`). This crate ties them to a session.

pub mod app;
pub mod errors;
pub mod session;
pub mod utils;

pub use app::{AppSettings, HouseholdApp, ImportOutcome};
pub use errors::{HogarError, HogarResult};
pub use session::{MemoryPeriodStorage, PeriodSession, PeriodStorage};

pub use hogar_config;
pub use hogar_core;
pub use hogar_domain;
pub use hogar_storage_json;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and logs the build it runs.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Like [`init`], using the configured `log_filter` unless `RUST_LOG` is set.
pub fn init_with_filter(directives: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(directives);
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            commit = build.commit,
            tree = build.tree,
            "hogar tracing initialized"
        );
    });
}

/// Loads the configuration, initializes tracing with its `log_filter` and
/// opens the configured household.
pub fn start(manager: hogar_config::ConfigManager) -> HogarResult<HouseholdApp> {
    let config = manager.load()?;
    init_with_filter(&config.log_filter);
    HouseholdApp::open_with_config(manager, config)
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter("hogar=debug");
    }
}
