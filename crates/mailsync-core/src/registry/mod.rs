//! Plugin-based remote client registry
//!
//! The registry allows remote clients to be registered dynamically at
//! runtime, so the daemon builds its client from configuration without
//! hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailsync_core::registry::ClientRegistry;
//! use mailsync_core::config::RemoteConfig;
//!
//! let registry = ClientRegistry::new();
//!
//! // In mailsync-provider-mailchimp
//! mailsync_provider_mailchimp::register(&registry);
//!
//! let client = registry.create_client(&RemoteConfig::mailchimp("key-us1"))?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::traits::{RemoteClient, RemoteClientFactory};

/// Registry of remote client factories keyed by provider type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Box<dyn RemoteClientFactory>>>,
}

impl ClientRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a remote client factory under `name` (e.g., "mailchimp")
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_client(&self, name: impl Into<String>, factory: Box<dyn RemoteClientFactory>) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        clients.insert(name.into(), factory);
    }

    /// Create a remote client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RemoteClient>)`: Created client instance
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_client(&self, config: &RemoteConfig) -> Result<Box<dyn RemoteClient>> {
        let provider_type = config.type_name();
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);

        let factory = clients
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {provider_type}")))?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_clients(&self) -> Vec<String> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = clients.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_client(&self, name: &str) -> bool {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        clients.contains_key(name)
    }
}
