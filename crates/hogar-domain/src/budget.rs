//! Per-period spending caps by category.

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// A spending cap for one category in one period.
///
/// `(period, category)` is the logical key. Updates match the category
/// exactly; importing into a period skips categories it already has in any
/// letter case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "periodo")]
    pub period: Period,
    pub category: String,
    #[serde(default)]
    pub cap: f64,
}

impl Budget {
    pub fn new(period: Period, category: impl Into<String>, cap: f64) -> Self {
        Self {
            period,
            category: category.into(),
            cap: if cap.is_finite() { cap } else { 0.0 },
        }
    }

    /// Key used to compare categories case-insensitively.
    pub fn category_key(&self) -> String {
        category_key(&self.category)
    }
}

/// Normalizes a category name for case-insensitive comparison.
pub fn category_key(name: &str) -> String {
    name.to_lowercase()
}
