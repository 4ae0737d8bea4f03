use std::path::Path;

use parsekit_rest::RestConfig;
use parsekit_store::StoreConfig;
use parsekit_types::BackendKind;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Client configuration, usually read from a TOML file:
///
/// ```toml
/// backend = "rest"
///
/// [rest]
/// base_url = "https://api.example.com/parse"
/// application_id = "myAppId"
/// rest_api_key = "myRestKey"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendKind,
    /// Required when `backend` is `rest`.
    pub rest: Option<RestConfig>,
    pub store: StoreConfig,
}

impl ClientConfig {
    /// A REST configuration with default store settings.
    pub fn rest(rest: RestConfig) -> Self {
        Self {
            backend: BackendKind::Rest,
            rest: Some(rest),
            store: StoreConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a file without validating it, for callers that layer overrides
    /// on top and call [`validate`](Self::validate) afterwards.
    pub fn read_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Check that the selected backend has everything it needs.
    pub fn validate(&self) -> SdkResult<()> {
        match self.backend {
            BackendKind::Rest => {
                let rest = self
                    .rest
                    .as_ref()
                    .ok_or_else(|| SdkError::Config("rest backend requires a [rest] section".into()))?;
                if rest.base_url.trim().is_empty() {
                    return Err(SdkError::Config("rest.base_url is empty".into()));
                }
                if rest.application_id.is_empty() {
                    return Err(SdkError::Config("rest.application_id is empty".into()));
                }
                if rest.timeout.is_zero() {
                    return Err(SdkError::Config("rest.timeout must be positive".into()));
                }
            }
            BackendKind::Document | BackendKind::KeyValue => {
                if self.store.database.is_empty() {
                    return Err(SdkError::Config("store.database is empty".into()));
                }
                if self.store.timeout.is_zero() {
                    return Err(SdkError::Config("store.timeout must be positive".into()));
                }
            }
        }
        Ok(())
    }
}
