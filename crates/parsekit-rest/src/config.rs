use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the object server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Server mount point, e.g. `https://api.example.com/parse`.
    pub base_url: String,
    /// Sent as `X-Parse-Application-Id`.
    pub application_id: String,
    /// Sent as `X-Parse-REST-API-Key`.
    pub rest_api_key: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337/parse".into(),
            application_id: String::new(),
            rest_api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RestConfig {
    pub fn new(
        base_url: impl Into<String>,
        application_id: impl Into<String>,
        rest_api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            application_id: application_id.into(),
            rest_api_key: rest_api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("application_id", &self.application_id)
            .field("rest_api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
