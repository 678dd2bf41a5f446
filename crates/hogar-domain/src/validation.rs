//! Input checks applied before anything reaches the store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(f64),
    #[error("cap must not be negative, got {0}")]
    NegativeCap(f64),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("effort must be a non-negative number, got {0}")]
    InvalidEffort(f64),
}
