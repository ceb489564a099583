//! Local/remote synchronizer
//!
//! The Synchronizer is responsible for:
//! - Resolving parents and scoping lookups
//! - Validating the remote-facing representation
//! - Ordering local persistence against the remote call
//! - Recording the provider-assigned id locally
//!
//! ## Architecture
//!
//! ```text
//!                     ┌──────────────┐
//!        caller ─────▶│ Synchronizer │
//!                     └──────────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         ▼                   ▼                   ▼
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────┐
//! │ ParentLookup │   │   LocalStore   │   │ RemoteClient │
//! │  (resolve)   │   │ (find / save)  │   │   (write)    │
//! └──────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Operation Order
//!
//! | operation | order |
//! |-----------|-------|
//! | create | parent → validate → save → remote create → save remote id |
//! | update | find → merge → validate → remote update → save |
//! | delete | find → child check → remote delete → local delete |
//! | read   | find |
//!
//! Create persists before the remote call so a remote failure still leaves
//! an addressable (unsynced) record. Update and delete call the remote
//! first so a remote failure leaves the local record untouched. Nothing is
//! compensated: a failure after one side succeeded leaves the two sides
//! inconsistent and is reported to the caller.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::entity::{self, SyncEntity};
use crate::error::{Error, ParentKey, Result};
use crate::traits::{ChildLookup, LocalStore, ParentLookup, ParentRecord, RemoteClient};

/// Keeps one entity kind consistent between the local store and the provider
///
/// The synchronizer holds no mutable state of its own and is shared across
/// request tasks behind an `Arc`. Concurrent operations on the same entity
/// are not coordinated.
pub struct Synchronizer<E: SyncEntity> {
    /// Local system of record for `E`
    store: Arc<dyn LocalStore<E>>,

    /// Remote provider client
    remote: Arc<dyn RemoteClient>,

    /// Parent resolution; `None` for root entities
    parents: Option<Arc<dyn ParentLookup>>,

    /// Dependents that block a delete; `None` when nothing references `E`
    children: Option<Arc<dyn ChildLookup>>,
}

impl<E: SyncEntity> Clone for Synchronizer<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
            parents: self.parents.clone(),
            children: self.children.clone(),
        }
    }
}

impl<E: SyncEntity> Synchronizer<E> {
    /// Create a synchronizer for a root entity (no parent)
    pub fn new(store: Arc<dyn LocalStore<E>>, remote: Arc<dyn RemoteClient>) -> Self {
        Self {
            store,
            remote,
            parents: None,
            children: None,
        }
    }

    /// Create a synchronizer for an entity scoped to a parent
    pub fn with_parents(
        store: Arc<dyn LocalStore<E>>,
        parents: Arc<dyn ParentLookup>,
        remote: Arc<dyn RemoteClient>,
    ) -> Self {
        Self {
            store,
            remote,
            parents: Some(parents),
            children: None,
        }
    }

    /// Refuse to delete an entity while `children` still reference it
    pub fn with_children(mut self, children: Arc<dyn ChildLookup>) -> Self {
        self.children = Some(children);
        self
    }

    /// Create an entity locally and on the provider
    ///
    /// # Errors
    ///
    /// - `ParentNotFound`: the parent does not exist (checked before anything else)
    /// - `ValidationFailed`: nothing was persisted
    /// - `RemoteCallFailed`: the local record exists with no remote id,
    ///   including when the parent itself was never synced
    pub async fn create(&self, parent_id: Option<&str>, input: Map<String, Value>) -> Result<E> {
        let parent = self.resolve_parent(parent_id).await?;

        let payload = entity::candidate::<E>(input);
        entity::validate::<E>(&payload)?;
        let fields = entity::decode::<E>(payload)?;
        let candidate = E::new(parent.as_ref().map(|p| p.local_id.clone()), fields)?;

        let mut saved = self.store.save(candidate).await?;
        let local_id = saved.local_id().unwrap_or_default().to_string();
        debug!("Saved {}[{}] locally", E::KIND, local_id);

        let payload = saved.remote_payload()?;
        let pushed = match self.collection_path(parent.as_ref()) {
            Ok(path) => self.remote.create(&path, &payload).await,
            // An unsynced parent has no remote collection to create into
            Err(e) => Err(e),
        };
        let record = match pushed {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Remote create failed for {}[{}], local record left unsynced: {}",
                    E::KIND,
                    local_id,
                    e
                );
                return Err(remote_failure(e));
            }
        };

        saved.set_remote_id(record.id);
        let saved = self.store.save(saved).await?;

        info!(
            "Created {}[{}] on {} as {}",
            E::KIND,
            local_id,
            self.remote.provider_name(),
            saved.remote_id().unwrap_or_default()
        );
        Ok(saved)
    }

    /// Read an entity from the local store
    ///
    /// The provider is never consulted.
    pub async fn read(&self, parent_id: Option<&str>, id: &str) -> Result<E> {
        self.find_scoped(parent_id, id).await
    }

    /// Merge-patch an entity and push it to the provider
    ///
    /// # Errors
    ///
    /// - `EntityNotFound`
    /// - `ValidationFailed`: no remote call was made
    /// - `RemoteCallFailed`: the local record keeps its previous values
    pub async fn update(
        &self,
        parent_id: Option<&str>,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<E> {
        let mut current = self.find_scoped(parent_id, id).await?;

        let payload = entity::merged(&current, patch)?;
        entity::validate::<E>(&payload)?;
        let fields = entity::decode::<E>(payload)?;

        let path = self.resource_path(&current).await?;
        current.set_fields(fields);

        let payload = current.remote_payload()?;
        self.remote
            .update(&path, &payload)
            .await
            .map_err(remote_failure)?;

        let saved = self.store.save(current).await?;
        info!("Updated {}[{}] at {}", E::KIND, id, path);
        Ok(saved)
    }

    /// Delete an entity from the provider, then locally
    ///
    /// An entity that never completed its remote create has no remote
    /// counterpart and is removed locally only.
    ///
    /// # Errors
    ///
    /// - `EntityNotFound`
    /// - `HasChildren`: child records still reference the entity; nothing
    ///   was called or deleted
    /// - `RemoteCallFailed`: the local record is untouched
    pub async fn delete(&self, parent_id: Option<&str>, id: &str) -> Result<()> {
        let current = self.find_scoped(parent_id, id).await?;

        if let Some(children) = &self.children {
            let count = children.count_children(id).await?;
            if count > 0 {
                debug!("{}[{}] still has {} {} record(s)", E::KIND, id, count, children.kind());
                return Err(Error::has_children(E::KIND, id, children.kind(), count));
            }
        }

        if current.remote_id().is_some() {
            let path = self.resource_path(&current).await?;
            self.remote.delete(&path).await.map_err(remote_failure)?;
            debug!("Deleted {}[{}] remotely at {}", E::KIND, id, path);
        } else {
            warn!(
                "{}[{}] was never synced to {}, deleting locally only",
                E::KIND,
                id,
                self.remote.provider_name()
            );
        }

        self.store.delete(&current).await?;
        info!("Deleted {}[{}]", E::KIND, id);
        Ok(())
    }

    /// Resolve the parent a create is scoped to
    async fn resolve_parent(&self, parent_id: Option<&str>) -> Result<Option<ParentRecord>> {
        let Some(parent_id) = self.scope(parent_id)? else {
            return Ok(None);
        };
        let parents = self.parent_lookup()?;

        match parents.find_parent(parent_id).await? {
            Some(parent) => Ok(Some(parent)),
            None => {
                debug!("{}[{}] not found", parents.kind(), parent_id);
                Err(Error::parent_not_found(parents.kind(), parent_id))
            }
        }
    }

    /// Find an entity within its parent scope
    async fn find_scoped(&self, parent_id: Option<&str>, id: &str) -> Result<E> {
        let scope = self.scope(parent_id)?;

        match self.store.find(scope, id).await? {
            Some(found) => Ok(found),
            None => {
                let parent = match scope {
                    Some(parent_id) => Some(ParentKey {
                        kind: self.parent_lookup()?.kind(),
                        id: parent_id.to_string(),
                    }),
                    None => None,
                };
                Err(Error::entity_not_found(E::KIND, id, parent))
            }
        }
    }

    /// Check that a parent id is given exactly when this entity is scoped
    fn scope<'a>(&self, parent_id: Option<&'a str>) -> Result<Option<&'a str>> {
        match (&self.parents, parent_id) {
            (Some(_), Some(parent_id)) => Ok(Some(parent_id)),
            (None, None) => Ok(None),
            (Some(parents), None) => Err(Error::config(format!(
                "{} operations require a {} id",
                E::KIND,
                parents.kind()
            ))),
            (None, Some(_)) => Err(Error::config(format!(
                "{} is not scoped to a parent",
                E::KIND
            ))),
        }
    }

    fn parent_lookup(&self) -> Result<&Arc<dyn ParentLookup>> {
        self.parents
            .as_ref()
            .ok_or_else(|| Error::config(format!("{} is not scoped to a parent", E::KIND)))
    }

    /// Remote collection path for new entities under `parent`
    fn collection_path(&self, parent: Option<&ParentRecord>) -> Result<String> {
        match parent {
            Some(parent) => {
                let remote_id = parent.remote_id.as_deref().ok_or_else(|| {
                    Error::remote(format!(
                        "{}[{}] has not been synced to {}",
                        self.parents
                            .as_ref()
                            .map_or("Parent", |parents| parents.kind()),
                        parent.local_id,
                        self.remote.provider_name()
                    ))
                })?;
                Ok(E::collection_path(Some(remote_id)))
            }
            None => Ok(E::collection_path(None)),
        }
    }

    /// Remote resource path of an existing entity
    async fn resource_path(&self, current: &E) -> Result<String> {
        let local_id = current.local_id().unwrap_or_default();
        let remote_id = current.remote_id().ok_or_else(|| {
            Error::remote(format!(
                "{}[{}] has not been synced to {}",
                E::KIND,
                local_id,
                self.remote.provider_name()
            ))
        })?;

        let parent = self.resolve_parent(current.parent_id()).await?;
        let collection = self.collection_path(parent.as_ref())?;
        Ok(format!("{collection}/{remote_id}"))
    }
}

/// Normalize any remote client failure into `RemoteCallFailed`
fn remote_failure(err: Error) -> Error {
    match err {
        Error::RemoteCallFailed(message) => Error::RemoteCallFailed(message),
        other => Error::remote(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_keeps_message() {
        let err = remote_failure(Error::remote("Forgotten Email Not Subscribed"));
        assert_eq!(err.to_string(), "Forgotten Email Not Subscribed");

        let err = remote_failure(Error::Other("connection reset".to_string()));
        assert!(matches!(err, Error::RemoteCallFailed(ref m) if m == "connection reset"));
    }
}
