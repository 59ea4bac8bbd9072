//! crates/pantry_core/src/error.rs
//!
//! Error taxonomy shared by every core operation.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range input, tagged with the offending field.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service Port Error: {0}")]
    Port(PortError),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => CoreError::NotFound(what),
            PortError::Unauthorized => CoreError::Unauthorized,
            other => CoreError::Port(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
