use std::any::{type_name, Any};
use std::sync::Arc;

use parsekit_rest::{RestAdapter, RestClient};
use parsekit_store::{
    DocumentAdapter, DocumentStore, InMemoryDocumentStore, InMemoryKeyValueStore, KeyValueAdapter,
    KeyValueStore, StoreConfig,
};
use parsekit_types::{BackendKind, ObjectBackend, ParseObject, ParseUser, Query};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{SdkError, SdkResult};

/// The backend a [`Client`] talks to.
#[derive(Clone, Debug)]
pub enum Backend {
    Rest(RestAdapter),
    Document(DocumentAdapter),
    KeyValue(KeyValueAdapter),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Rest(a) => a.kind(),
            Self::Document(a) => a.kind(),
            Self::KeyValue(a) => a.kind(),
        }
    }
}

/// Persistence facade over exactly one backend.
///
/// Cheap to clone; clones share the backend handle.
#[derive(Clone, Debug)]
pub struct Client {
    backend: Backend,
}

impl Client {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn rest(client: RestClient) -> Self {
        Self::new(Backend::Rest(RestAdapter::new(client)))
    }

    pub fn document(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self::new(Backend::Document(DocumentAdapter::new(store, config)))
    }

    pub fn key_value(store: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        Self::new(Backend::KeyValue(KeyValueAdapter::new(store, config)))
    }

    /// Build a client from an untyped backend handle.
    ///
    /// Recognized handles are [`RestClient`], `Arc<dyn DocumentStore>`,
    /// `Arc<dyn KeyValueStore>`, and `Arc`s of the in-memory drivers. Any
    /// other type fails with [`SdkError::UnsupportedBackend`].
    pub fn from_handle<H: Any + Send + Sync>(handle: H, config: StoreConfig) -> SdkResult<Self> {
        let handle: Box<dyn Any> = Box::new(handle);
        let handle = match handle.downcast::<RestClient>() {
            Ok(client) => return Ok(Self::rest(*client)),
            Err(other) => other,
        };
        let handle = match handle.downcast::<Arc<dyn DocumentStore>>() {
            Ok(store) => return Ok(Self::document(*store, config)),
            Err(other) => other,
        };
        let handle = match handle.downcast::<Arc<InMemoryDocumentStore>>() {
            Ok(store) => return Ok(Self::document(*store, config)),
            Err(other) => other,
        };
        let handle = match handle.downcast::<Arc<dyn KeyValueStore>>() {
            Ok(store) => return Ok(Self::key_value(*store, config)),
            Err(other) => other,
        };
        match handle.downcast::<Arc<InMemoryKeyValueStore>>() {
            Ok(store) => Ok(Self::key_value(*store, config)),
            Err(_) => Err(SdkError::UnsupportedBackend {
                type_name: type_name::<H>(),
            }),
        }
    }

    /// Build a REST client from validated configuration.
    ///
    /// Document and key-value backends need a driver the configuration cannot
    /// describe; use [`Client::from_config_with_handle`] for those.
    pub fn from_config(config: &ClientConfig) -> SdkResult<Self> {
        config.validate()?;
        let client = match config.backend {
            BackendKind::Rest => {
                let rest = config
                    .rest
                    .as_ref()
                    .ok_or_else(|| SdkError::Config("missing [rest] section".into()))?;
                Self::rest(RestClient::new(rest)?)
            }
            kind @ (BackendKind::Document | BackendKind::KeyValue) => {
                return Err(SdkError::Config(format!(
                    "the {kind} backend needs a driver handle; use Client::from_config_with_handle"
                )));
            }
        };
        info!(backend = %client.kind(), "client ready");
        Ok(client)
    }

    /// Build a client from configuration plus a driver handle.
    ///
    /// The handle is resolved as in [`Client::from_handle`] using
    /// `config.store`, and must match `config.backend`.
    pub fn from_config_with_handle<H: Any + Send + Sync>(
        config: &ClientConfig,
        handle: H,
    ) -> SdkResult<Self> {
        config.validate()?;
        let client = Self::from_handle(handle, config.store.clone())?;
        if client.kind() != config.backend {
            return Err(SdkError::Config(format!(
                "configured backend is {} but the handle is a {} driver",
                config.backend,
                client.kind()
            )));
        }
        info!(backend = %client.kind(), "client ready");
        Ok(client)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Create or update `object` in the backend.
    pub async fn save(&self, object: &mut ParseObject) -> SdkResult<()> {
        debug!(backend = %self.kind(), class = object.class_name(), "save");
        match &self.backend {
            Backend::Rest(a) => a.save(object).await?,
            Backend::Document(a) => a.save(object).await?,
            Backend::KeyValue(a) => a.save(object).await?,
        }
        Ok(())
    }

    pub async fn delete(&self, object: &ParseObject) -> SdkResult<()> {
        debug!(backend = %self.kind(), class = object.class_name(), object_id = %object.object_id(), "delete");
        match &self.backend {
            Backend::Rest(a) => a.delete(object).await?,
            Backend::Document(a) => a.delete(object).await?,
            Backend::KeyValue(a) => a.delete(object).await?,
        }
        Ok(())
    }

    pub async fn find(&self, query: &Query) -> SdkResult<Vec<ParseObject>> {
        debug!(backend = %self.kind(), class = query.class_name(), "find");
        let found = match &self.backend {
            Backend::Rest(a) => a.find(query).await?,
            Backend::Document(a) => a.find(query).await?,
            Backend::KeyValue(a) => a.find(query).await?,
        };
        Ok(found)
    }

    /// Register a new user. Only the REST backend has an account service.
    pub async fn sign_up(&self, user: &mut ParseUser) -> SdkResult<()> {
        match &self.backend {
            Backend::Rest(a) => Ok(a.sign_up(user).await?),
            other => Err(SdkError::Unsupported {
                operation: "sign_up",
                backend: other.kind(),
            }),
        }
    }
}
