use thiserror::Error;

use hogar_config::ConfigError;
use hogar_core::{AuthError, CoreError, ErrorKind, StoreError};
use hogar_domain::PeriodParseError;

/// Error type for the application layer.
#[derive(Debug, Error)]
pub enum HogarError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] PeriodParseError),
    #[error("User `{user_id}` is not a member of household `{household_id}`")]
    NotAMember {
        user_id: String,
        household_id: String,
    },
}

impl HogarError {
    /// Failure class of a core or store error; `None` for application-level failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            HogarError::Core(err) => Some(err.kind()),
            HogarError::Store(_) => Some(ErrorKind::Store),
            HogarError::InvalidPeriod(_) => Some(ErrorKind::Validation),
            _ => None,
        }
    }
}

pub type HogarResult<T> = Result<T, HogarError>;
