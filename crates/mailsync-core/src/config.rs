//! Configuration types for the mailsync system
//!
//! This module defines all configuration structures used throughout the crate.
//! The daemon fills them from the environment; library users can build or
//! deserialize them directly.

use serde::{Deserialize, Serialize};

/// Default HTTP listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default provider request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound for the provider request timeout
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Default directory for file stores
pub const DEFAULT_STORE_DIR: &str = "./data";

/// Main mailsync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote provider configuration
    pub remote: RemoteConfig,

    /// Local store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.server.validate()?;
        self.remote.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl ServerConfig {
    /// Validate the server settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map(|_| ())
            .map_err(|e| {
                crate::Error::config(format!("Invalid bind address '{}': {}", self.bind_addr, e))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Remote provider configuration
///
/// The Debug output never contains the API key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteConfig {
    /// MailChimp Marketing API v3
    Mailchimp {
        /// API key, `{key}-{dc}`
        api_key: String,
        /// Override for the data-center base URL (testing, proxies)
        #[serde(default)]
        base_url: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl RemoteConfig {
    /// MailChimp configuration with default timeout and base URL
    pub fn mailchimp(api_key: impl Into<String>) -> Self {
        RemoteConfig::Mailchimp {
            api_key: api_key.into(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Validate the remote configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RemoteConfig::Mailchimp {
                api_key,
                base_url,
                timeout_secs,
            } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("MailChimp API key cannot be empty"));
                }
                if base_url.is_none() && data_center(api_key).is_none() {
                    return Err(crate::Error::config(
                        "MailChimp API key must end with a data-center suffix (e.g. '-us1')",
                    ));
                }
                if !(1..=MAX_TIMEOUT_SECS).contains(timeout_secs) {
                    return Err(crate::Error::config(format!(
                        "MailChimp timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
                    )));
                }
                Ok(())
            }
            RemoteConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            RemoteConfig::Mailchimp { .. } => "mailchimp",
            RemoteConfig::Custom { factory, .. } => factory,
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteConfig::Mailchimp {
                base_url,
                timeout_secs,
                ..
            } => f
                .debug_struct("Mailchimp")
                .field("api_key", &"<REDACTED>")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            RemoteConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", &"<REDACTED>")
                .finish(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig::mailchimp(String::new())
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Data-center suffix of a MailChimp API key (`abc123-us6` -> `us6`)
pub fn data_center(api_key: &str) -> Option<&str> {
    api_key
        .rsplit_once('-')
        .map(|(_, dc)| dc)
        .filter(|dc| !dc.is_empty() && dc.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Local store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// One JSON file per entity kind inside `dir`
    File {
        /// Directory holding the store files
        dir: String,
    },

    /// In-memory store (not persistent)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Parse a store type name (`file` or `memory`)
    pub fn from_type(kind: &str, dir: impl Into<String>) -> Result<Self, crate::Error> {
        match kind {
            "file" => Ok(StoreConfig::File { dir: dir.into() }),
            "memory" => Ok(StoreConfig::Memory),
            other => Err(crate::Error::config(format!(
                "Unknown store type: {other} (expected 'file' or 'memory')"
            ))),
        }
    }

    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { dir } if dir.is_empty() => {
                Err(crate::Error::config("Store directory cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_center_suffix() {
        assert_eq!(data_center("0123456789abcdef-us6"), Some("us6"));
        assert_eq!(data_center("a-b-us12"), Some("us12"));
        assert_eq!(data_center("nodatacenter"), None);
        assert_eq!(data_center("trailing-"), None);
    }

    #[test]
    fn test_remote_config_validation() {
        assert!(RemoteConfig::mailchimp("key-us1").validate().is_ok());
        assert!(RemoteConfig::mailchimp("").validate().is_err());
        assert!(RemoteConfig::mailchimp("nodc").validate().is_err());

        let with_base = RemoteConfig::Mailchimp {
            api_key: "nodc".to_string(),
            base_url: Some("http://127.0.0.1:9000".to_string()),
            timeout_secs: 30,
        };
        assert!(with_base.validate().is_ok());

        let zero_timeout = RemoteConfig::Mailchimp {
            api_key: "key-us1".to_string(),
            base_url: None,
            timeout_secs: 0,
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_store_config_from_type() {
        assert!(matches!(
            StoreConfig::from_type("file", "/tmp/x"),
            Ok(StoreConfig::File { ref dir }) if dir == "/tmp/x"
        ));
        assert!(matches!(StoreConfig::from_type("memory", ""), Ok(StoreConfig::Memory)));
        assert!(matches!(
            StoreConfig::from_type("redis", ""),
            Err(crate::Error::Config(ref m)) if m.contains("redis")
        ));
        assert!(StoreConfig::from_type("file", "").unwrap().validate().is_err());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: SyncConfig = serde_json::from_value(serde_json::json!({
            "remote": { "type": "mailchimp", "api_key": "key-us1" }
        }))
        .unwrap();

        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
        assert!(matches!(config.store, StoreConfig::Memory));
        assert!(matches!(
            config.remote,
            RemoteConfig::Mailchimp { timeout_secs: 30, .. }
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = RemoteConfig::mailchimp("secret_key_12345-us1");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let mut config = SyncConfig {
            remote: RemoteConfig::mailchimp("key-us1"),
            ..SyncConfig::default()
        };
        config.server.bind_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }
}
