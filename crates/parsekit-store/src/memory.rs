use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Document, DocumentStore, FindOptions, KeyValueStore, Namespace};

/// In-memory document database.
///
/// Intended for tests and embedding. Collections are created on first insert.
/// An optional artificial latency is applied before every call so timeout
/// handling can be exercised.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Namespace, BTreeMap<String, Document>>>,
    writes: AtomicU64,
    latency: Option<Duration>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
            latency: None,
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of successful mutating calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of rows in `ns`.
    pub async fn count(&self, ns: &Namespace) -> usize {
        self.collections
            .read()
            .await
            .get(ns)
            .map_or(0, BTreeMap::len)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn document_id(ns: &Namespace, document: &Document) -> StoreResult<String> {
    document
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Backend(format!("document for {ns} has no string _id")))
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, ns: &Namespace, document: Document) -> StoreResult<()> {
        self.delay().await;
        let id = document_id(ns, &document)?;
        let mut collections = self.collections.write().await;
        let rows = collections.entry(ns.clone()).or_default();
        if rows.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                namespace: ns.to_string(),
                id,
            });
        }
        rows.insert(id, document);
        self.record_write();
        Ok(())
    }

    async fn update_one(&self, ns: &Namespace, id: &str, set: Document) -> StoreResult<u64> {
        self.delay().await;
        let mut collections = self.collections.write().await;
        let Some(row) = collections.get_mut(ns).and_then(|rows| rows.get_mut(id)) else {
            return Ok(0);
        };
        for (key, value) in set {
            row.insert(key, value);
        }
        self.record_write();
        Ok(1)
    }

    async fn delete_one(&self, ns: &Namespace, id: &str) -> StoreResult<u64> {
        self.delay().await;
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(ns)
            .and_then(|rows| rows.remove(id))
            .is_some();
        if removed {
            self.record_write();
        }
        Ok(u64::from(removed))
    }

    async fn find_one(&self, ns: &Namespace, id: &str) -> StoreResult<Option<Document>> {
        self.delay().await;
        let collections = self.collections.read().await;
        Ok(collections.get(ns).and_then(|rows| rows.get(id)).cloned())
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        self.delay().await;
        let collections = self.collections.read().await;
        let Some(rows) = collections.get(ns) else {
            return Ok(Vec::new());
        };
        let matching = rows
            .values()
            .filter(|row| {
                filter
                    .iter()
                    .all(|(path, expected)| lookup(row, path) == Some(expected))
            })
            .skip(options.skip as usize);
        let found = if options.limit > 0 {
            matching.take(options.limit as usize).cloned().collect()
        } else {
            matching.cloned().collect()
        };
        Ok(found)
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("writes", &self.write_count())
            .field("latency", &self.latency)
            .finish()
    }
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory key-value store with optional per-key expiry.
pub struct InMemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, Entry>>,
    writes: AtomicU64,
    latency: Option<Duration>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            writes: AtomicU64::new(0),
            latency: None,
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of successful mutating calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// `Some(true)` if `key` is live and will expire, `Some(false)` if it is
    /// live and permanent, `None` if it is absent.
    pub async fn expires(&self, key: &str) -> Option<bool> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_live(Instant::now()))
            .map(|e| e.expires_at.is_some())
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        self.delay().await;
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.delay().await;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(Instant::now()))
            .map(|e| e.value.clone()))
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.delay().await;
        let removed = self.entries.write().await.remove(key);
        let existed = removed.is_some_and(|e| e.is_live(Instant::now()));
        if existed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(existed)
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.delay().await;
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(_, e)| e.is_live(now))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

impl std::fmt::Debug for InMemoryKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyValueStore")
            .field("writes", &self.write_count())
            .field("latency", &self.latency)
            .finish()
    }
}
