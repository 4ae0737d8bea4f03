use thiserror::Error;

/// Errors produced by model operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("object id already assigned: {current} (refusing {attempted})")]
    IdAlreadyAssigned { current: String, attempted: String },

    #[error("invalid {scheme} identifier: {id:?}")]
    InvalidId { scheme: &'static str, id: String },

    #[error("failed to encode query constraint: {0}")]
    QueryEncoding(String),

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

pub type TypeResult<T> = Result<T, TypeError>;
