//! Test doubles and common utilities for synchronizer contract tests
//!
//! The remote double records every call instead of talking to a provider,
//! so tests can assert both what reached the remote side and what ended up
//! in the local store.

#![allow(dead_code)]

use async_trait::async_trait;
use mailsync_core::error::{Error, Result};
use mailsync_core::traits::{RemoteClient, RemoteRecord};
use mailsync_core::{
    LocalStore, MailChimpList, MailChimpMember, MemoryStore, StoreChildren, StoreParents,
    Synchronizer,
};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One call observed by [`RecordingRemoteClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: &'static str,
    pub path: String,
    pub payload: Option<Map<String, Value>>,
}

/// A remote client that records calls and hands out sequential ids
///
/// Built with [`RecordingRemoteClient::failing`], every call is still
/// recorded but fails with the given message.
pub struct RecordingRemoteClient {
    create_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    delete_call_count: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<RemoteCall>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingRemoteClient {
    pub fn new() -> Self {
        Self {
            create_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// A client whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        let client = Self::new();
        client.fail_with(message);
        client
    }

    /// Make subsequent calls fail with `message`
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Make subsequent calls succeed again
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Create a new client that shares counters (and failure mode) with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            create_call_count: Arc::clone(&other.create_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            delete_call_count: Arc::clone(&other.delete_call_count),
            calls: Arc::clone(&other.calls),
            failure: Arc::clone(&other.failure),
        }
    }

    pub fn create_call_count(&self) -> usize {
        self.create_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    pub fn total_call_count(&self) -> usize {
        self.create_call_count() + self.update_call_count() + self.delete_call_count()
    }

    /// Every call seen so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<RemoteCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, method: &'static str, path: &str, payload: Option<&Map<String, Value>>) {
        self.calls.lock().unwrap().push(RemoteCall {
            method,
            path: path.to_string(),
            payload: payload.cloned(),
        });
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(Error::remote(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteClient for RecordingRemoteClient {
    async fn create(&self, path: &str, payload: &Map<String, Value>) -> Result<RemoteRecord> {
        let n = self.create_call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.record("POST", path, Some(payload));
        self.check_failure()?;

        let id = format!("remote-{n}");
        let mut body = payload.clone();
        body.insert("id".to_string(), Value::String(id.clone()));
        Ok(RemoteRecord {
            id,
            body: Value::Object(body),
        })
    }

    async fn update(&self, path: &str, payload: &Map<String, Value>) -> Result<Value> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.record("PATCH", path, Some(payload));
        self.check_failure()?;
        Ok(Value::Object(payload.clone()))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.record("DELETE", path, None);
        self.check_failure()
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Synchronizers for both entity kinds wired to memory stores and one remote
pub struct Harness {
    pub lists: Synchronizer<MailChimpList>,
    pub members: Synchronizer<MailChimpMember>,
    pub list_store: MemoryStore<MailChimpList>,
    pub member_store: MemoryStore<MailChimpMember>,
    pub remote: RecordingRemoteClient,
}

impl Harness {
    pub fn new() -> Self {
        let list_store = MemoryStore::<MailChimpList>::new();
        let member_store = MemoryStore::<MailChimpMember>::new();
        let remote = RecordingRemoteClient::new();

        let lists_arc: Arc<dyn LocalStore<MailChimpList>> = Arc::new(list_store.clone());
        let members_arc: Arc<dyn LocalStore<MailChimpMember>> = Arc::new(member_store.clone());
        let remote_arc: Arc<dyn RemoteClient> =
            Arc::new(RecordingRemoteClient::sharing_counters_with(&remote));

        Self {
            lists: Synchronizer::new(Arc::clone(&lists_arc), Arc::clone(&remote_arc))
                .with_children(Arc::new(StoreChildren::new(Arc::clone(&members_arc)))),
            members: Synchronizer::with_parents(
                members_arc,
                Arc::new(StoreParents::new(lists_arc)),
                remote_arc,
            ),
            list_store,
            member_store,
            remote,
        }
    }

    /// Create a list that is synced to the remote side; returns its local id
    pub async fn synced_list(&self) -> String {
        let list = self.lists.create(None, list_input()).await.unwrap();
        assert!(list.mail_chimp_id.is_some());
        list.list_id.unwrap()
    }
}

/// Unwrap a JSON object literal into a map
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A complete, valid list representation
pub fn list_input() -> Map<String, Value> {
    object(json!({
        "name": "New list",
        "permission_reminder": "You signed up for updates on our website",
        "email_type_option": false,
        "contact": {
            "company": "Doe Ltd.",
            "address1": "DoeStreet 1",
            "city": "Doesy",
            "state": "Doedoe",
            "zip": "1672-12",
            "country": "US"
        },
        "campaign_defaults": {
            "from_name": "John Doe",
            "from_email": "john@doe.com",
            "subject": "My new campaign!",
            "language": "US"
        },
        "visibility": "prv"
    }))
}

/// A minimal, valid member representation
pub fn member_input(email: &str) -> Map<String, Value> {
    object(json!({
        "email_address": email,
        "status": "subscribed"
    }))
}
