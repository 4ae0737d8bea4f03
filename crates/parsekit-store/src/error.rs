use std::time::Duration;

use parsekit_types::TypeError;

/// Errors from document and key-value adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The driver did not answer within the configured bound. For writes the
    /// outcome is unknown; `object_id` names the id that was in flight.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
        object_id: Option<String>,
    },

    /// An update addressed a row that does not exist.
    #[error("no object {id} in {namespace}")]
    NotFound { namespace: String, id: String },

    /// Insert collided with an existing row.
    #[error("duplicate id {id} in {namespace}")]
    DuplicateKey { namespace: String, id: String },

    /// Delete was asked for an object that was never saved.
    #[error("cannot delete unsaved {class} object")]
    MissingObjectId { class: String },

    /// Error reported by the underlying database driver.
    #[error("backend error: {0}")]
    Backend(String),

    /// Encoding an object for the store failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value could not be decoded back into an object.
    #[error("corrupt value at {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error(transparent)]
    Model(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
