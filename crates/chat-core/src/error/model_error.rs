//! Model errors - raised when a payload value cannot be applied to an entity

use thiserror::Error;

/// Entity-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}
