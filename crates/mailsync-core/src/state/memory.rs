// # Memory Store
//
// In-memory implementation of LocalStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for testing and for throwaway deployments.
//
// ## Crash Behavior
//
// - All records are lost on restart/crash
// - Remote resources created before a restart are orphaned locally

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entity::SyncEntity;
use crate::error::Result;
use crate::traits::LocalStore;

/// In-memory store implementation
///
/// Records are kept in a HashMap keyed by local identifier, protected by
/// a RwLock. Cloning the store shares the underlying map.
///
/// # Example
///
/// ```rust,no_run
/// use mailsync_core::{LocalStore, MailChimpList, MemoryStore};
///
/// # async fn demo() -> mailsync_core::Result<()> {
/// let store = MemoryStore::<MailChimpList>::new();
/// assert!(store.list(None).await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore<E: SyncEntity> {
    inner: Arc<RwLock<HashMap<String, E>>>,
}

impl<E: SyncEntity> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: SyncEntity> MemoryStore<E> {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<E: SyncEntity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: SyncEntity> LocalStore<E> for MemoryStore<E> {
    async fn find(&self, scope: Option<&str>, id: &str) -> Result<Option<E>> {
        let guard = self.inner.read().await;
        Ok(guard.get(id).filter(|e| in_scope(*e, scope)).cloned())
    }

    async fn save(&self, mut entity: E) -> Result<E> {
        let id = assign_local_id(&mut entity);
        let mut guard = self.inner.write().await;
        guard.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        if let Some(id) = entity.local_id() {
            let mut guard = self.inner.write().await;
            guard.remove(id);
        }
        Ok(())
    }

    async fn list(&self, scope: Option<&str>) -> Result<Vec<E>> {
        let guard = self.inner.read().await;
        Ok(guard.values().filter(|e| in_scope(*e, scope)).cloned().collect())
    }

    async fn flush(&self) -> Result<()> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}

/// Whether `entity` belongs to `scope` (every entity matches no scope)
pub(crate) fn in_scope<E: SyncEntity>(entity: &E, scope: Option<&str>) -> bool {
    match scope {
        Some(parent_id) => entity.parent_id() == Some(parent_id),
        None => true,
    }
}

/// Give `entity` a fresh local id if it has none; returns the id
pub(crate) fn assign_local_id<E: SyncEntity>(entity: &mut E) -> String {
    match entity.local_id() {
        Some(id) => id.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            entity.set_local_id(id.clone());
            id
        }
    }
}
