use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Client-side settings for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_household_id")]
    pub household_id: String,

    /// Last period the user was looking at, as `YYYY-MM`. Unset means the
    /// current calendar month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period: Option<String>,

    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "Config::default_recent_expense_limit")]
    pub recent_expense_limit: usize,

    #[serde(default = "Config::default_aggregation_expense_limit")]
    pub aggregation_expense_limit: usize,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory for household data. Defaults to `data/` under the base directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            household_id: Self::default_household_id(),
            current_period: None,
            currency_symbol: Self::default_currency_symbol(),
            recent_expense_limit: Self::default_recent_expense_limit(),
            aggregation_expense_limit: Self::default_aggregation_expense_limit(),
            log_filter: Self::default_log_filter(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_household_id() -> String {
        "hogar-principal".into()
    }

    pub fn default_currency_symbol() -> String {
        "L".into()
    }

    pub fn default_recent_expense_limit() -> usize {
        60
    }

    pub fn default_aggregation_expense_limit() -> usize {
        1000
    }

    pub fn default_log_filter() -> String {
        "hogar=info".into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.household_id.trim().is_empty() {
            return Err(ConfigError::Invalid("household_id must not be empty".into()));
        }
        if self.recent_expense_limit == 0 || self.aggregation_expense_limit == 0 {
            return Err(ConfigError::Invalid(
                "expense limits must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
