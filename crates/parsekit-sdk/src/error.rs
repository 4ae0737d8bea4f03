use parsekit_types::BackendKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// The handle given to [`Client::from_handle`](crate::Client::from_handle)
    /// is not a recognized backend.
    #[error("unsupported backend handle type: {type_name}")]
    UnsupportedBackend { type_name: &'static str },

    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: BackendKind,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rest error: {0}")]
    Rest(#[from] parsekit_rest::RestError),

    #[error("store error: {0}")]
    Store(#[from] parsekit_store::StoreError),

    #[error("object error: {0}")]
    Types(#[from] parsekit_types::TypeError),
}

pub type SdkResult<T> = Result<T, SdkError>;
