use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by the document and key-value adapters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Logical database holding one collection per class.
    pub database: String,
    /// Upper bound on each individual driver call.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: "parse".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.database, "parse");
        assert_eq!(c.timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: StoreConfig = serde_json::from_str(r#"{"database": "app"}"#).unwrap();
        assert_eq!(c.database, "app");
        assert_eq!(c.timeout, Duration::from_secs(10));
    }
}
