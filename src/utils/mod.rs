pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default directive when neither `RUST_LOG` nor a configured filter is set.
pub const DEFAULT_LOG_FILTER: &str = "hogar=info";

/// Installs the global subscriber with [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Installs the global subscriber once, filtered by [`log_directives`].
pub fn init_tracing_with(directives: &str) {
    TRACING_INIT.call_once(|| {
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = EnvFilter::new(log_directives(env.as_deref(), directives));

        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Picks the first parsable of `RUST_LOG`, the configured directives and
/// [`DEFAULT_LOG_FILTER`].
pub fn log_directives(env: Option<&str>, configured: &str) -> String {
    env.into_iter()
        .chain(std::iter::once(configured))
        .map(str::trim)
        .find(|candidate| !candidate.is_empty() && EnvFilter::try_new(candidate).is_ok())
        .unwrap_or(DEFAULT_LOG_FILTER)
        .to_string()
}
