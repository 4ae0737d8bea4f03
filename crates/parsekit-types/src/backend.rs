//! The capability every storage adapter provides.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::id::IdScheme;
use crate::object::ParseObject;
use crate::query::Query;

/// Identity of a storage backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Remote object server over HTTP.
    #[default]
    Rest,
    /// Document database, one collection per class.
    Document,
    /// Key-value store, one key per object.
    KeyValue,
}

impl BackendKind {
    /// The identifier scheme objects saved through this backend receive.
    pub fn id_scheme(&self) -> IdScheme {
        match self {
            Self::Rest => IdScheme::Server,
            Self::Document => IdScheme::ObjectIdHex,
            Self::KeyValue => IdScheme::Uuid,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Document => write!(f, "document"),
            Self::KeyValue => write!(f, "key-value"),
        }
    }
}

/// Save, delete, and find objects in one backend.
///
/// Implementations must uphold the identifier policy: `save` assigns an id
/// only when the object has none and never changes an existing one, whether
/// the call succeeds or fails.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn kind(&self) -> BackendKind;

    /// Create or update `object`, filling in whatever the store reports back.
    async fn save(&self, object: &mut ParseObject) -> Result<(), Self::Error>;

    /// Remove `object` from the store. The in-memory value is left untouched.
    async fn delete(&self, object: &ParseObject) -> Result<(), Self::Error>;

    /// Return the objects of `query.class_name()` matching `query`.
    async fn find(&self, query: &Query) -> Result<Vec<ParseObject>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(BackendKind::Rest.to_string(), "rest");
        assert_eq!(BackendKind::KeyValue.to_string(), "key-value");
    }

    #[test]
    fn kind_serde_snake_case() {
        assert_eq!(serde_json::to_string(&BackendKind::KeyValue).unwrap(), "\"key_value\"");
        let k: BackendKind = serde_json::from_str("\"document\"").unwrap();
        assert_eq!(k, BackendKind::Document);
    }

    #[test]
    fn kind_id_schemes() {
        assert_eq!(BackendKind::Rest.id_scheme(), IdScheme::Server);
        assert_eq!(BackendKind::Document.id_scheme(), IdScheme::ObjectIdHex);
        assert_eq!(BackendKind::KeyValue.id_scheme(), IdScheme::Uuid);
    }
}
