use std::sync::Arc;

use async_trait::async_trait;
use parsekit_types::{BackendKind, Fields, IdScheme, ObjectBackend, ObjectId, ParseObject, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::deadline::bounded;
use crate::error::{StoreError, StoreResult};
use crate::traits::{Document, DocumentStore, FindOptions, Namespace};

/// Shape of one row: `{_id, className, data}`.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(rename = "className")]
    class_name: String,
    #[serde(default)]
    data: Fields,
}

impl DocumentRecord {
    fn into_document(self) -> StoreResult<Document> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Serialization("record is not an object".into())),
            Err(e) => Err(StoreError::Serialization(e.to_string())),
        }
    }

    fn from_document(ns: &Namespace, document: Document) -> StoreResult<Self> {
        serde_json::from_value(Value::Object(document)).map_err(|e| StoreError::Decode {
            key: ns.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Persists objects in a document database, one collection per class.
///
/// New objects get a locally minted [`IdScheme::ObjectIdHex`] id and are
/// inserted whole. Saved objects are updated by replacing only their `data`
/// sub-document, so metadata other writers put on the row survives.
///
/// Updating an id with no row fails with [`StoreError::NotFound`] rather than
/// succeeding with zero matches. Deleting an id with no row succeeds.
#[derive(Clone)]
pub struct DocumentAdapter {
    store: Arc<dyn DocumentStore>,
    config: StoreConfig,
}

impl DocumentAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn namespace(&self, class_name: &str) -> Namespace {
        Namespace::new(self.config.database.clone(), class_name)
    }

    async fn insert(&self, object: &mut ParseObject) -> StoreResult<()> {
        let ns = self.namespace(object.class_name());
        let id = IdScheme::ObjectIdHex.generate()?;
        let record = DocumentRecord {
            id: id.clone(),
            class_name: object.class_name().to_string(),
            data: object.fields().clone(),
        };
        let document = record.into_document()?;
        bounded(
            "insert",
            self.config.timeout,
            Some(&id),
            self.store.insert_one(&ns, document),
        )
        .await?;
        debug!(namespace = %ns, object_id = %id, "inserted document");
        object.assign_id(id)?;
        Ok(())
    }

    async fn update(&self, object: &ParseObject) -> StoreResult<()> {
        let ns = self.namespace(object.class_name());
        let id = object.object_id();
        let mut set = Document::new();
        set.insert("data".into(), Value::Object(object.fields().clone()));
        let matched = bounded(
            "update",
            self.config.timeout,
            Some(id),
            self.store.update_one(&ns, id.as_str(), set),
        )
        .await?;
        if matched == 0 {
            return Err(StoreError::NotFound {
                namespace: ns.to_string(),
                id: id.to_string(),
            });
        }
        debug!(namespace = %ns, object_id = %id, "updated document data");
        Ok(())
    }
}

#[async_trait]
impl ObjectBackend for DocumentAdapter {
    type Error = StoreError;

    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    async fn save(&self, object: &mut ParseObject) -> StoreResult<()> {
        if object.is_new() {
            self.insert(object).await
        } else {
            self.update(object).await
        }
    }

    async fn delete(&self, object: &ParseObject) -> StoreResult<()> {
        if object.is_new() {
            return Err(StoreError::MissingObjectId {
                class: object.class_name().to_string(),
            });
        }
        let ns = self.namespace(object.class_name());
        let id = object.object_id();
        let removed = bounded(
            "delete",
            self.config.timeout,
            Some(id),
            self.store.delete_one(&ns, id.as_str()),
        )
        .await?;
        debug!(namespace = %ns, object_id = %id, removed, "deleted document");
        Ok(())
    }

    async fn find(&self, query: &Query) -> StoreResult<Vec<ParseObject>> {
        let ns = self.namespace(query.class_name());
        let filter: Document = query
            .constraints()
            .iter()
            .map(|(key, value)| (format!("data.{key}"), value.clone()))
            .collect();
        let options = FindOptions {
            skip: query.skip(),
            limit: query.limit(),
        };
        let rows = bounded(
            "find",
            self.config.timeout,
            None,
            self.store.find(&ns, &filter, options),
        )
        .await?;
        debug!(namespace = %ns, count = rows.len(), "found documents");
        rows.into_iter()
            .map(|row| {
                let record = DocumentRecord::from_document(&ns, row)?;
                Ok(ParseObject::with_id(query.class_name(), record.id, record.data))
            })
            .collect()
    }
}

impl std::fmt::Debug for DocumentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
