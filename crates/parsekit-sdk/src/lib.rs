//! High-level parsekit client.
//!
//! [`Client`] is the entry point for applications: it owns exactly one
//! backend and routes `save`, `delete`, `find`, and `sign_up` to it. Objects
//! and users can also persist themselves through the [`Persist`] trait.
//!
//! ```ignore
//! let client = Client::rest(RestClient::new(&RestConfig::new(url, app_id, key))?);
//! let mut note = ParseObject::new("Note", fields_from([("text", "hi".into())]));
//! note.save(&client).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod persist;

pub use client::{Backend, Client};
pub use config::ClientConfig;
pub use error::{SdkError, SdkResult};
pub use persist::Persist;

// Re-export key types
pub use parsekit_rest::{RestAdapter, RestClient, RestConfig};
pub use parsekit_store::{
    DocumentAdapter, DocumentStore, InMemoryDocumentStore, InMemoryKeyValueStore, KeyValueAdapter,
    KeyValueStore, StoreConfig,
};
pub use parsekit_types::{
    Acl, BackendKind, Fields, ObjectBackend, ObjectId, ParseObject, ParseUser, Query, Value,
};
