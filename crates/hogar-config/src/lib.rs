//! hogar-config
//!
//! Persistent client configuration, including the "current period" pointer
//! that survives across sessions on the same device.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigManager, HOME_ENV};
pub use model::Config;
