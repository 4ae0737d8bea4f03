use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::acl::Acl;
use crate::error::{TypeError, TypeResult};
use crate::id::ObjectId;
use crate::value::{Fields, Value};

/// Keys the server manages itself. They never live in [`ParseObject::fields`].
pub const RESERVED_KEYS: [&str; 5] = ["objectId", "className", "createdAt", "updatedAt", "ACL"];

/// A persisted entity, shared by every backend.
///
/// The class name is fixed at construction. The id starts empty and is set
/// exactly once, by the first successful save; see [`assign_id`].
///
/// [`assign_id`]: ParseObject::assign_id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseObject {
    class_name: String,
    #[serde(default, skip_serializing_if = "ObjectId::is_empty")]
    object_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "ACL", default, skip_serializing_if = "Option::is_none")]
    acl: Option<Acl>,
    #[serde(default)]
    fields: Fields,
}

impl ParseObject {
    /// Create an unsaved object.
    pub fn new(class_name: impl Into<String>, fields: Fields) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: ObjectId::empty(),
            created_at: None,
            updated_at: None,
            acl: None,
            fields,
        }
    }

    /// Create a handle to an object that already exists in a store.
    pub fn with_id(class_name: impl Into<String>, id: impl Into<ObjectId>, fields: Fields) -> Self {
        let mut object = Self::new(class_name, fields);
        object.object_id = id.into();
        object
    }

    /// Build an object from a server-side JSON row, lifting the reserved keys
    /// out of the field map.
    ///
    /// A malformed timestamp or `ACL` is logged and left unset; the row is
    /// still returned.
    pub fn from_server_fields(class_name: impl Into<String>, mut raw: Fields) -> Self {
        let mut object = Self::new(class_name, Fields::new());
        if let Some(Value::String(id)) = raw.remove("objectId") {
            object.object_id = ObjectId::from(id);
        }
        object.created_at = timestamp_field(&raw, "createdAt");
        object.updated_at = timestamp_field(&raw, "updatedAt");
        raw.remove("createdAt");
        raw.remove("updatedAt");
        if let Some(acl) = raw.remove("ACL") {
            object.acl = match serde_json::from_value(acl) {
                Ok(acl) => Some(acl),
                Err(e) => {
                    warn!(
                        class = %object.class_name,
                        object_id = %object.object_id,
                        error = %e,
                        "ignoring malformed ACL"
                    );
                    None
                }
            };
        }
        raw.remove("className");
        object.fields = raw;
        object
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns `true` until the first successful save.
    pub fn is_new(&self) -> bool {
        self.object_id.is_empty()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }

    pub fn set_acl(&mut self, acl: Option<Acl>) {
        self.acl = acl;
    }

    /// Record the identifier chosen by the store.
    ///
    /// Assigning the id the object already carries is a no-op. Assigning a
    /// different id to a saved object fails and leaves the object untouched.
    pub fn assign_id(&mut self, id: ObjectId) -> TypeResult<()> {
        if self.object_id.is_empty() {
            self.object_id = id;
            Ok(())
        } else if self.object_id == id {
            Ok(())
        } else {
            Err(TypeError::IdAlreadyAssigned {
                current: self.object_id.to_string(),
                attempted: id.to_string(),
            })
        }
    }

    /// Apply backend-reported audit timestamps. `None` leaves a value as is.
    pub fn apply_timestamps(
        &mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) {
        if created_at.is_some() {
            self.created_at = created_at;
        }
        if updated_at.is_some() {
            self.updated_at = updated_at;
        }
    }
}

/// Read an RFC 3339 timestamp field from a server reply.
///
/// Missing, non-string, and unparseable values all read as `None`; the last
/// case is logged.
pub fn timestamp_field(fields: &Fields, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.as_str()?;
    match parse_timestamp(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed timestamp");
            None
        }
    }
}

/// Parse an RFC 3339 timestamp as sent by the server.
pub fn parse_timestamp(value: &str) -> TypeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TypeError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
