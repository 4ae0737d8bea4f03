//! Driver interfaces the adapters are written against.
//!
//! A real deployment implements these over its database client; the
//! in-memory versions in [`crate::memory`] back the tests.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// A raw document row.
pub type Document = serde_json::Map<String, Value>;

/// A collection inside a database.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Paging applied by the driver after filtering. Zero means "no bound".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u32,
    pub limit: u32,
}

/// Document database client.
///
/// Rows are keyed by their `_id` field. Implementations must be safe for
/// concurrent use; the adapter shares one handle across all callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new row. Fails with `DuplicateKey` if `_id` already exists.
    async fn insert_one(&self, ns: &Namespace, document: Document) -> StoreResult<()>;

    /// Set the given top-level fields on the row with `_id == id`, leaving
    /// every other field alone. Returns the number of rows matched.
    async fn update_one(&self, ns: &Namespace, id: &str, set: Document) -> StoreResult<u64>;

    /// Remove the row with `_id == id`. Returns the number of rows removed.
    async fn delete_one(&self, ns: &Namespace, id: &str) -> StoreResult<u64>;

    /// Fetch one row by `_id`.
    async fn find_one(&self, ns: &Namespace, id: &str) -> StoreResult<Option<Document>>;

    /// Rows whose fields equal every entry of `filter`. Filter keys may be
    /// dotted paths (`"data.text"`). Results are ordered by `_id`.
    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;
}

/// Key-value client with string values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `value` under `key`, replacing any previous value. `ttl: None`
    /// means the key never expires.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove `key`. Returns `true` if it existed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// All live keys starting with `prefix`, sorted.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_display() {
        assert_eq!(Namespace::new("parse", "Note").to_string(), "parse.Note");
    }

    #[test]
    fn find_options_default_is_unbounded() {
        let o = FindOptions::default();
        assert_eq!((o.skip, o.limit), (0, 0));
    }
}
