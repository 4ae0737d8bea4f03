use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// Opaque object identifier.
///
/// An empty `ObjectId` means the object has not been persisted yet. Consumers
/// must never interpret the contents: each backend uses its own scheme and the
/// only portable operations are equality and display.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// The empty identifier of an unsaved object.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Wrap an identifier string as-is.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns `true` if no identifier has been assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "ObjectId(<unsaved>)")
        } else {
            write!(f, "ObjectId({})", self.0)
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a backend mints identifiers for new objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// Assigned by the remote server; any non-empty string is valid.
    Server,
    /// 12-byte document id rendered as 24 lowercase hex characters:
    /// 4-byte big-endian seconds, 5 process-random bytes, 3-byte counter.
    ObjectIdHex,
    /// Random RFC 4122 version 4 UUID in hyphenated form.
    Uuid,
}

impl IdScheme {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::ObjectIdHex => "object-id",
            Self::Uuid => "uuid",
        }
    }

    /// Mint a fresh identifier.
    ///
    /// `Server` ids cannot be minted locally; asking for one is a caller bug
    /// and returns [`TypeError::InvalidId`].
    pub fn generate(&self) -> TypeResult<ObjectId> {
        match self {
            Self::Server => Err(TypeError::InvalidId {
                scheme: self.name(),
                id: String::new(),
            }),
            Self::ObjectIdHex => Ok(ObjectId(object_id_hex())),
            Self::Uuid => Ok(ObjectId(uuid::Uuid::new_v4().hyphenated().to_string())),
        }
    }

    /// Returns `true` if `id` is well formed for this scheme.
    pub fn is_valid(&self, id: &ObjectId) -> bool {
        let s = id.as_str();
        match self {
            Self::Server => !s.is_empty(),
            Self::ObjectIdHex => {
                s.len() == 24 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            }
            Self::Uuid => s.len() == 36 && uuid::Uuid::try_parse(s).is_ok(),
        }
    }

    /// Like [`is_valid`](Self::is_valid) but returns an error naming the scheme.
    pub fn validate(&self, id: &ObjectId) -> TypeResult<()> {
        if self.is_valid(id) {
            Ok(())
        } else {
            Err(TypeError::InvalidId {
                scheme: self.name(),
                id: id.to_string(),
            })
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn object_id_hex() -> String {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

    let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
    let counter = COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>()))
        .fetch_add(1, Ordering::Relaxed);
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32;

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..9].copy_from_slice(process);
    bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn empty_id() {
        let id = ObjectId::empty();
        assert!(id.is_empty());
        assert_eq!(id, ObjectId::default());
        assert_eq!(format!("{id:?}"), "ObjectId(<unsaved>)");
    }

    #[test]
    fn display_is_raw_string() {
        let id = ObjectId::from("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(format!("{id:?}"), "ObjectId(abc123)");
    }

    #[test]
    fn serde_transparent() {
        let id = ObjectId::from("xyz");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"xyz\"");
        let back: ObjectId = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn object_id_hex_shape() {
        let id = IdScheme::ObjectIdHex.generate().unwrap();
        assert_eq!(id.as_str().len(), 24);
        assert!(IdScheme::ObjectIdHex.is_valid(&id));
        assert!(!IdScheme::Uuid.is_valid(&id));
    }

    #[test]
    fn object_id_hex_unique() {
        let ids: HashSet<_> = (0..1000)
            .map(|_| IdScheme::ObjectIdHex.generate().unwrap())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn uuid_shape() {
        let id = IdScheme::Uuid.generate().unwrap();
        assert_eq!(id.as_str().len(), 36);
        assert!(IdScheme::Uuid.is_valid(&id));
        assert!(!IdScheme::ObjectIdHex.is_valid(&id));
    }

    #[test]
    fn server_scheme_cannot_generate() {
        assert!(matches!(
            IdScheme::Server.generate(),
            Err(TypeError::InvalidId { scheme: "server", .. })
        ));
    }

    #[test]
    fn server_scheme_accepts_any_non_empty() {
        assert!(IdScheme::Server.is_valid(&ObjectId::from("Ed1nuqPvcm")));
        assert!(!IdScheme::Server.is_valid(&ObjectId::empty()));
    }

    #[test]
    fn validate_reports_scheme() {
        let err = IdScheme::Uuid.validate(&ObjectId::from("nope")).unwrap_err();
        assert_eq!(err.to_string(), "invalid uuid identifier: \"nope\"");
    }

    proptest! {
        #[test]
        fn uppercase_hex_is_rejected(s in "[A-F]{24}") {
            prop_assert!(!IdScheme::ObjectIdHex.is_valid(&ObjectId::from(s)));
        }

        #[test]
        fn lowercase_hex_24_is_accepted(s in "[0-9a-f]{24}") {
            prop_assert!(IdScheme::ObjectIdHex.is_valid(&ObjectId::from(s)));
        }
    }
}
