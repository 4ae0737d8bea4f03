//! Document-store and key-value adapters for parsekit.
//!
//! Both adapters persist [`ParseObject`]s through a narrow driver trait so the
//! database client itself stays outside this crate:
//!
//! - [`DocumentAdapter`] over a [`DocumentStore`]: one collection per class,
//!   rows shaped `{_id, className, data}`, updates touch only `data`
//! - [`KeyValueAdapter`] over a [`KeyValueStore`]: one key per object,
//!   `"{className}:{id}"`, every save rewrites the whole value
//!
//! In-memory drivers ([`InMemoryDocumentStore`], [`InMemoryKeyValueStore`])
//! are provided for tests and embedding.
//!
//! # Design Rules
//!
//! 1. Ids are minted by the adapter only when the object has none.
//! 2. An object's id is set only after its first write succeeds.
//! 3. Every driver call is bounded by [`StoreConfig::timeout`]. A timed-out
//!    write is not rolled back: its outcome is unknown.
//! 4. Nothing is retried. Driver errors are propagated, never swallowed.
//!
//! [`ParseObject`]: parsekit_types::ParseObject

pub mod config;
pub mod document;
pub mod error;
pub mod keyvalue;
pub mod memory;
pub mod traits;

mod deadline;

pub use config::StoreConfig;
pub use document::DocumentAdapter;
pub use error::{StoreError, StoreResult};
pub use keyvalue::KeyValueAdapter;
pub use memory::{InMemoryDocumentStore, InMemoryKeyValueStore};
pub use traits::{Document, DocumentStore, FindOptions, KeyValueStore, Namespace};
