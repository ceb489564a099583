//! Shared helpers for HTTP integration tests
//!
//! The router runs over memory stores and a fake remote client, and is
//! driven in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use mailsync_api::{AppState, router};
use mailsync_core::traits::{RemoteClient, RemoteRecord};
use mailsync_core::{Error, MailChimpList, MailChimpMember, MemoryStore, Result};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Remote client that hands out sequential ids, or fails on demand
#[derive(Default)]
pub struct FakeRemote {
    created: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl FakeRemote {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(Error::remote(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn create(&self, _path: &str, payload: &Map<String, Value>) -> Result<RemoteRecord> {
        self.check()?;
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteRecord {
            id: format!("mc-{n}"),
            body: Value::Object(payload.clone()),
        })
    }

    async fn update(&self, _path: &str, payload: &Map<String, Value>) -> Result<Value> {
        self.check()?;
        Ok(Value::Object(payload.clone()))
    }

    async fn delete(&self, _path: &str) -> Result<()> {
        self.check()
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

pub struct TestApp {
    pub app: Router,
    pub remote: Arc<FakeRemote>,
}

impl TestApp {
    pub fn new() -> Self {
        let remote = Arc::new(FakeRemote::default());
        let state = AppState::new(
            Arc::new(MemoryStore::<MailChimpList>::new()),
            Arc::new(MemoryStore::<MailChimpMember>::new()),
            Arc::clone(&remote) as Arc<dyn RemoteClient>,
        );

        Self {
            app: router(state),
            remote,
        }
    }

    /// Send one request; returns the status and the decoded JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        };
        self.send_raw(method, uri, body).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Create a list through the API; returns its local id
    pub async fn create_list(&self) -> String {
        let (status, body) = self
            .send(Method::POST, "/mailchimp/lists", Some(list_body()))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["list_id"].as_str().unwrap().to_string()
    }
}

pub fn list_body() -> Value {
    json!({
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
    })
}
