// # Local Store Trait
//
// Defines the interface for the local system of record.
//
// ## Purpose
//
// The local store decides whether an entity exists and holds its field
// values. It is the only thing reads are served from; the remote provider
// is never queried.
//
// ## Implementations
//
// - In-memory: `MemoryStore`
// - File-based: `FileStore` (one JSON file per entity kind)
//
// ## Usage
//
// ```rust,ignore
// use mailsync_core::{LocalStore, MailChimpMember};
//
// async fn show(store: &dyn LocalStore<MailChimpMember>) -> mailsync_core::Result<()> {
//     // Members are always looked up through their list
//     let member = store.find(Some("list-id"), "member-id").await?;
//     println!("{member:?}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::entity::SyncEntity;
use crate::error::Result;

/// Trait for local store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Concurrent saves of the same entity are last-write-wins.
///
/// # Responsibilities
///
/// - ✅ Assign an opaque local identifier on first save
/// - ✅ Scope lookups to a parent when one is given
/// - ❌ Validate entities (owned by `Synchronizer`)
/// - ❌ Talk to the remote provider (owned by `Synchronizer`)
#[async_trait]
pub trait LocalStore<E: SyncEntity>: Send + Sync {
    /// Find an entity by local identifier
    ///
    /// When `scope` is `Some(parent_id)`, only an entity owned by that
    /// parent matches.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entity))`: Found
    /// - `Ok(None)`: No such entity in this scope
    /// - `Err(Error)`: Storage error
    async fn find(&self, scope: Option<&str>, id: &str) -> Result<Option<E>>;

    /// Insert or update an entity
    ///
    /// An entity without a local identifier is inserted and receives a
    /// fresh one; otherwise the stored record is replaced.
    ///
    /// # Returns
    ///
    /// The entity as stored (with its local identifier set)
    async fn save(&self, entity: E) -> Result<E>;

    /// Delete an entity (no-op if it does not exist)
    async fn delete(&self, entity: &E) -> Result<()>;

    /// List every entity in a scope (all entities when `scope` is `None`)
    async fn list(&self, scope: Option<&str>) -> Result<Vec<E>>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<()>;
}

/// The parts of a parent record a child operation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRecord {
    pub local_id: String,
    pub remote_id: Option<String>,
}

/// Resolves parent identifiers for scoped entities
#[async_trait]
pub trait ParentLookup: Send + Sync {
    /// Entity kind of the parent (used in not-found messages)
    fn kind(&self) -> &'static str;

    /// Find a parent by local identifier
    async fn find_parent(&self, id: &str) -> Result<Option<ParentRecord>>;
}

/// Adapts any local store into a [`ParentLookup`]
pub struct StoreParents<P: SyncEntity> {
    store: Arc<dyn LocalStore<P>>,
}

impl<P: SyncEntity> StoreParents<P> {
    pub fn new(store: Arc<dyn LocalStore<P>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<P: SyncEntity> ParentLookup for StoreParents<P> {
    fn kind(&self) -> &'static str {
        P::KIND
    }

    async fn find_parent(&self, id: &str) -> Result<Option<ParentRecord>> {
        let parent = self.store.find(None, id).await?;
        Ok(parent.map(|parent| ParentRecord {
            local_id: parent.local_id().unwrap_or(id).to_string(),
            remote_id: parent.remote_id().map(str::to_string),
        }))
    }
}

/// Counts the records that still reference a parent
///
/// Used to refuse deleting a parent that has dependents.
#[async_trait]
pub trait ChildLookup: Send + Sync {
    /// Entity kind of the children (used in messages)
    fn kind(&self) -> &'static str;

    /// Number of children owned by `parent_id`
    async fn count_children(&self, parent_id: &str) -> Result<usize>;
}

/// Adapts any scoped local store into a [`ChildLookup`]
pub struct StoreChildren<C: SyncEntity> {
    store: Arc<dyn LocalStore<C>>,
}

impl<C: SyncEntity> StoreChildren<C> {
    pub fn new(store: Arc<dyn LocalStore<C>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<C: SyncEntity> ChildLookup for StoreChildren<C> {
    fn kind(&self) -> &'static str {
        C::KIND
    }

    async fn count_children(&self, parent_id: &str) -> Result<usize> {
        Ok(self.store.list(Some(parent_id)).await?.len())
    }
}
