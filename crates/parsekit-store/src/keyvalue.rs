use std::sync::Arc;

use async_trait::async_trait;
use parsekit_types::{BackendKind, Fields, IdScheme, ObjectBackend, ObjectId, ParseObject, Query};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StoreConfig;
use crate::deadline::bounded;
use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// Value stored under each key: `{objectId, className, data}`.
#[derive(Debug, Serialize, Deserialize)]
struct KeyValueRecord {
    #[serde(rename = "objectId")]
    object_id: ObjectId,
    #[serde(rename = "className")]
    class_name: String,
    #[serde(default)]
    data: Fields,
}

/// Composite key for one object.
pub fn object_key(class_name: &str, id: &ObjectId) -> String {
    format!("{class_name}:{id}")
}

/// Persists objects in a key-value store, one key per object.
///
/// Every save rewrites the full value under `"{className}:{id}"` with no
/// expiry. There is no partial update and no concurrency check: the last
/// writer wins.
#[derive(Clone)]
pub struct KeyValueAdapter {
    store: Arc<dyn KeyValueStore>,
    config: StoreConfig,
}

impl KeyValueAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    async fn load(&self, key: &str) -> StoreResult<Option<KeyValueRecord>> {
        let raw = bounded("get", self.config.timeout, None, self.store.get(key)).await?;
        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ObjectBackend for KeyValueAdapter {
    type Error = StoreError;

    fn kind(&self) -> BackendKind {
        BackendKind::KeyValue
    }

    async fn save(&self, object: &mut ParseObject) -> StoreResult<()> {
        let id = if object.is_new() {
            IdScheme::Uuid.generate()?
        } else {
            object.object_id().clone()
        };
        let key = object_key(object.class_name(), &id);
        let record = KeyValueRecord {
            object_id: id.clone(),
            class_name: object.class_name().to_string(),
            data: object.fields().clone(),
        };
        let value =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        bounded(
            "set",
            self.config.timeout,
            Some(&id),
            self.store.set(&key, value, None),
        )
        .await?;
        debug!(%key, "wrote object");
        object.assign_id(id)?;
        Ok(())
    }

    async fn delete(&self, object: &ParseObject) -> StoreResult<()> {
        if object.is_new() {
            return Err(StoreError::MissingObjectId {
                class: object.class_name().to_string(),
            });
        }
        let key = object_key(object.class_name(), object.object_id());
        let existed = bounded(
            "del",
            self.config.timeout,
            Some(object.object_id()),
            self.store.del(&key),
        )
        .await?;
        debug!(%key, existed, "deleted object");
        Ok(())
    }

    async fn find(&self, query: &Query) -> StoreResult<Vec<ParseObject>> {
        let prefix = format!("{}:", query.class_name());
        let keys = bounded(
            "scan",
            self.config.timeout,
            None,
            self.store.scan_prefix(&prefix),
        )
        .await?;

        let mut matching = Vec::new();
        for key in keys {
            // Keys can expire or be deleted between the scan and the read.
            let Some(record) = self.load(&key).await? else {
                continue;
            };
            if query.matches(&record.data) {
                matching.push(ParseObject::with_id(
                    query.class_name(),
                    record.object_id,
                    record.data,
                ));
            }
        }
        debug!(%prefix, count = matching.len(), "scanned objects");
        Ok(query.window(matching))
    }
}

impl std::fmt::Debug for KeyValueAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
