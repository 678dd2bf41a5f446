use thiserror::Error;

use hogar_domain::{Period, PeriodParseError, ValidationError};

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] PeriodParseError),
    #[error("Period {0} is already closed")]
    AlreadyClosed(Period),
    #[error("Period {0} is not closed")]
    NotClosed(Period),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Malformed document `{id}` in `{collection}`: {reason}")]
    MalformedDocument {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Failure classes surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any store call.
    Validation,
    /// Network, permission or data failure from the document store.
    Store,
    /// Guard condition of the closure state machine.
    State,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::InvalidPeriod(_) => ErrorKind::Validation,
            CoreError::AlreadyClosed(_) | CoreError::NotClosed(_) => ErrorKind::State,
            CoreError::Store(_) | CoreError::MalformedDocument { .. } => ErrorKind::Store,
        }
    }
}
