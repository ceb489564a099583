//! Shared handler state

use std::sync::Arc;

use mailsync_core::{
    LocalStore, MailChimpList, MailChimpMember, RemoteClient, StoreChildren, StoreParents,
    Synchronizer,
};

/// One synchronizer per entity kind, cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub lists: Synchronizer<MailChimpList>,
    pub members: Synchronizer<MailChimpMember>,
}

impl AppState {
    /// Wire both synchronizers to their stores and one remote client
    ///
    /// Members resolve their list through `list_store`; a list cannot be
    /// deleted while `member_store` still holds members of it.
    pub fn new(
        list_store: Arc<dyn LocalStore<MailChimpList>>,
        member_store: Arc<dyn LocalStore<MailChimpMember>>,
        remote: Arc<dyn RemoteClient>,
    ) -> Self {
        let parents = Arc::new(StoreParents::new(Arc::clone(&list_store)));
        let children = Arc::new(StoreChildren::new(Arc::clone(&member_store)));
        Self {
            lists: Synchronizer::new(list_store, Arc::clone(&remote)).with_children(children),
            members: Synchronizer::with_parents(member_store, parents, remote),
        }
    }
}
