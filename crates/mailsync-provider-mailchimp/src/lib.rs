// # MailChimp Remote Client
//
// This crate provides the MailChimp Marketing API v3 implementation of
// `RemoteClient` for the mailsync system.
//
// ## Behavior
//
// - ✅ Makes exactly one HTTP request per call (POST, PATCH or DELETE)
// - ✅ HTTP timeout configured (30 seconds by default)
// - ✅ Provider error bodies (`detail`, then `title`) become the error message
// - ✅ Base URL derived from the API key's data-center suffix
// - ❌ NO retry logic (failures are reported to the caller)
// - ❌ NO reads of remote state (reads are served locally)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if the key is empty
//
// ## API Reference
//
// - Base URL: `https://{dc}.api.mailchimp.com/3.0`
// - Auth: HTTP basic, any username, the API key as password
// - Create: POST `/lists`, POST `/lists/{list_id}/members`
// - Update: PATCH `/lists/{list_id}`, PATCH `/lists/{list_id}/members/{subscriber_hash}`
// - Delete: DELETE on the same resource paths

use async_trait::async_trait;
use mailsync_core::config::{DEFAULT_TIMEOUT_SECS, RemoteConfig, data_center};
use mailsync_core::traits::{RemoteClient, RemoteClientFactory, RemoteRecord};
use mailsync_core::{ClientRegistry, Error, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Basic-auth user name; MailChimp ignores it
const AUTH_USER: &str = "apikey";

/// Failures of a single MailChimp call
#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; carries what MailChimp said about it
    #[error("{0}")]
    Status(String),

    #[error("Invalid response from MailChimp: {0}")]
    InvalidResponse(String),
}

impl From<CallError> for Error {
    fn from(err: CallError) -> Self {
        Error::remote(err.to_string())
    }
}

/// Problem document MailChimp returns on errors
#[derive(Debug, Default, Deserialize)]
struct ProblemBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ProblemBody {
    fn message(self, status: StatusCode) -> String {
        [self.detail, self.title]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status.to_string())
    }
}

/// MailChimp Marketing API client
///
/// Stateless and single-shot; all ordering against the local store is
/// owned by `Synchronizer`.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct MailChimpClient {
    /// API key (`{key}-{dc}`)
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API root, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for MailChimpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailChimpClient")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MailChimpClient {
    /// Create a new MailChimp client
    ///
    /// # Parameters
    ///
    /// - `api_key`: MailChimp API key, `{key}-{dc}`
    /// - `base_url`: Optional API root overriding the data-center URL
    /// - `timeout`: Per-request timeout
    ///
    /// # Errors
    ///
    /// `Error::Config` if the key is empty, or has no data-center suffix
    /// and no `base_url` is given.
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("MailChimp API key cannot be empty"));
        }

        let base_url = match base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let dc = data_center(&api_key).ok_or_else(|| {
                    Error::config("MailChimp API key has no data-center suffix (e.g. '-us1')")
                })?;
                format!("https://{dc}.api.mailchimp.com/3.0")
            }
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url,
            client,
        })
    }

    /// Create a client for the key's data center with the default timeout
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(api_key, None, DEFAULT_HTTP_TIMEOUT)
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform one call and return the decoded response body
    ///
    /// Empty successful bodies (204 No Content) decode to `Value::Null`.
    async fn call(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Map<String, Value>>,
    ) -> std::result::Result<Value, CallError> {
        let url = self.url(path);
        tracing::debug!("MailChimp {} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(AUTH_USER, Some(&self.api_key));
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let problem: ProblemBody = serde_json::from_str(&body).unwrap_or_default();
            let message = problem.message(status);
            tracing::debug!("MailChimp {} {} failed: {} ({})", method, url, message, status);
            return Err(CallError::Status(message));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| CallError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteClient for MailChimpClient {
    async fn create(&self, path: &str, payload: &Map<String, Value>) -> Result<RemoteRecord> {
        let body = self.call(Method::POST, path, Some(payload)).await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CallError::InvalidResponse("created resource has no id".to_string()))?;

        tracing::debug!("MailChimp assigned id {} under {}", id, path);
        Ok(RemoteRecord { id, body })
    }

    async fn update(&self, path: &str, payload: &Map<String, Value>) -> Result<Value> {
        Ok(self.call(Method::PATCH, path, Some(payload)).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.call(Method::DELETE, path, None).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mailchimp"
    }
}

/// Factory for creating MailChimp clients
pub struct MailChimpFactory;

impl RemoteClientFactory for MailChimpFactory {
    fn create(&self, config: &RemoteConfig) -> Result<Box<dyn RemoteClient>> {
        match config {
            RemoteConfig::Mailchimp {
                api_key,
                base_url,
                timeout_secs,
            } => {
                if api_key.is_empty() {
                    return Err(Error::config("MailChimp API key is required"));
                }
                if base_url.is_some() {
                    tracing::warn!("MailChimp base URL overridden; not using the data-center URL");
                }

                Ok(Box::new(MailChimpClient::new(
                    api_key.clone(),
                    base_url.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
            _ => Err(Error::config("Invalid config for MailChimp client")),
        }
    }
}

/// Register the MailChimp client with a registry
///
/// # Example
///
/// ```rust
/// use mailsync_core::ClientRegistry;
///
/// let registry = ClientRegistry::new();
/// mailsync_provider_mailchimp::register(&registry);
/// assert!(registry.has_client("mailchimp"));
/// ```
pub fn register(registry: &ClientRegistry) {
    registry.register_client("mailchimp", Box::new(MailChimpFactory));
}
