// # Remote Client Trait
//
// Defines the interface for writing to the remote email-marketing provider.
//
// ## Implementations
//
// - MailChimp: `mailsync-provider-mailchimp` crate
//
// ## Usage
//
// ```rust,ignore
// use mailsync_core::RemoteClient;
//
// async fn push(client: &dyn RemoteClient) -> mailsync_core::Result<()> {
//     let payload = serde_json::Map::new();
//     let created = client.create("lists/abc/members", &payload).await?;
//     println!("remote id: {}", created.id);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Result of a remote create
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    /// Identifier assigned by the provider
    pub id: String,
    /// Full response body, as returned by the provider
    pub body: Value,
}

/// Trait for remote client implementations
///
/// # Responsibilities
///
/// Remote clients are write-only and single-shot:
///
/// - ✅ Perform exactly one HTTP call per method invocation
/// - ✅ Turn provider failures into `Error::RemoteCallFailed` with a message
/// - ❌ Retry or back off (failures propagate to the caller as-is)
/// - ❌ Read remote state back
/// - ❌ Touch the local store (owned by `Synchronizer`)
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Create a resource in the collection at `path`
    ///
    /// # Returns
    ///
    /// - `Ok(RemoteRecord)`: The provider-assigned id and response body
    /// - `Err(Error)`: If the call failed
    async fn create(&self, path: &str, payload: &Map<String, Value>)
    -> crate::Result<RemoteRecord>;

    /// Update the resource at `path`
    async fn update(&self, path: &str, payload: &Map<String, Value>) -> crate::Result<Value>;

    /// Delete the resource at `path`
    async fn delete(&self, path: &str) -> crate::Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing remote clients from configuration
pub trait RemoteClientFactory: Send + Sync {
    /// Create a RemoteClient instance from configuration
    fn create(
        &self,
        config: &crate::config::RemoteConfig,
    ) -> crate::Result<Box<dyn RemoteClient>>;
}
