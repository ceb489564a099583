// # mailsyncd - MailChimp synchronization daemon
//
// The mailsyncd daemon is a thin integration layer. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering remote clients and opening the local stores
// 4. Serving the HTTP API until SIGTERM/SIGINT
//
// All synchronization logic lives in mailsync-core; all HTTP mapping lives
// in mailsync-api.
//
// ## Configuration
//
// ### Server
// - `MAILSYNC_BIND_ADDR`: Listen address (default `0.0.0.0:8080`)
//
// ### MailChimp
// - `MAILCHIMP_API_KEY`: API key, `{key}-{dc}` (required)
// - `MAILCHIMP_BASE_URL`: API root override (optional)
// - `MAILCHIMP_TIMEOUT_SECS`: Request timeout, 1..=300 (default 30)
//
// ### Local Store
// - `MAILSYNC_STORE_TYPE`: `file` or `memory` (default `file`)
// - `MAILSYNC_STORE_DIR`: Directory for file stores (default `./data`)
//
// ### Logging
// - `RUST_LOG`: Full `EnvFilter` directives (takes precedence)
// - `MAILSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export MAILCHIMP_API_KEY=0123456789abcdef0123456789abcdef-us6
// export MAILSYNC_STORE_DIR=/var/lib/mailsync
//
// mailsyncd
// ```

use anyhow::{Context, Result};
use mailsync_api::AppState;
use mailsync_core::config::{
    DEFAULT_BIND_ADDR, DEFAULT_STORE_DIR, DEFAULT_TIMEOUT_SECS, RemoteConfig, ServerConfig,
    StoreConfig, SyncConfig,
};
use mailsync_core::state::open_store;
use mailsync_core::{ClientRegistry, MailChimpList, MailChimpMember, RemoteClient};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long to wait for the final store flush after the server stops
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum MailsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<MailsyncExitCode> for ExitCode {
    fn from(code: MailsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Raw settings as read from the environment
struct Config {
    bind_addr: String,
    /// ⚠️ NEVER log this value
    api_key: String,
    base_url: Option<String>,
    timeout_secs: Option<String>,
    store_type: String,
    store_dir: String,
    log_level: String,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("store_type", &self.store_type)
            .field("store_dir", &self.store_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (environment in production)
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("MAILCHIMP_API_KEY").context(
            "MAILCHIMP_API_KEY is required. \
            Set it via: export MAILCHIMP_API_KEY=your_key-us1",
        )?;

        Ok(Self {
            bind_addr: lookup("MAILSYNC_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_key,
            base_url: lookup("MAILCHIMP_BASE_URL").filter(|url| !url.is_empty()),
            timeout_secs: lookup("MAILCHIMP_TIMEOUT_SECS"),
            store_type: lookup("MAILSYNC_STORE_TYPE").unwrap_or_else(|| "file".to_string()),
            store_dir: lookup("MAILSYNC_STORE_DIR").unwrap_or_else(|| DEFAULT_STORE_DIR.to_string()),
            log_level: lookup("MAILSYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration and build the library configuration
    ///
    /// This performs:
    /// - Placeholder detection for the API key
    /// - Numeric range validation
    /// - Store type and log level enumeration
    /// - Library-level validation (`SyncConfig::validate`)
    fn validate(&self) -> Result<SyncConfig> {
        let key_lower = self.api_key.to_lowercase();
        if key_lower.contains("your_key")
            || key_lower.contains("replace_me")
            || key_lower.starts_with("example")
        {
            anyhow::bail!(
                "MAILCHIMP_API_KEY appears to be a placeholder. \
                Use an actual API key from your MailChimp account."
            );
        }

        let timeout_secs = match &self.timeout_secs {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("MAILCHIMP_TIMEOUT_SECS must be a whole number of seconds. Got: {raw}")
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MAILSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        let config = SyncConfig {
            server: ServerConfig {
                bind_addr: self.bind_addr.clone(),
            },
            remote: RemoteConfig::Mailchimp {
                api_key: self.api_key.clone(),
                base_url: self.base_url.clone(),
                timeout_secs,
            },
            store: StoreConfig::from_type(&self.store_type, self.store_dir.clone())
                .context("MAILSYNC_STORE_TYPE is not supported")?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return MailsyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    let sync_config = match config.validate() {
        Ok(sync_config) => sync_config,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return MailsyncExitCode::ConfigError.into();
        }
    };

    // Initialize tracing; RUST_LOG wins over MAILSYNC_LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MailsyncExitCode::ConfigError.into();
    }

    info!("Starting mailsyncd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MailsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(sync_config).await {
            error!("Daemon error: {:#}", e);
            MailsyncExitCode::RuntimeError
        } else {
            MailsyncExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: SyncConfig) -> Result<()> {
    let registry = ClientRegistry::new();

    // Register built-in remote clients
    #[cfg(feature = "mailchimp")]
    {
        info!("Registering MailChimp client");
        mailsync_provider_mailchimp::register(&registry);
    }

    let remote: Arc<dyn RemoteClient> = Arc::from(
        registry
            .create_client(&config.remote)
            .context("Failed to create remote client")?,
    );
    info!("Remote provider: {}", remote.provider_name());

    let list_store = open_store::<MailChimpList>(&config.store)
        .await
        .context("Failed to open list store")?;
    let member_store = open_store::<MailChimpMember>(&config.store)
        .await
        .context("Failed to open member store")?;
    info!("Local store: {:?}", config.store);

    let state = AppState::new(Arc::clone(&list_store), Arc::clone(&member_store), remote);
    let app = mailsync_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Flushing local stores");
    let flushed = tokio::time::timeout(FLUSH_TIMEOUT, async {
        list_store.flush().await?;
        member_store.flush().await
    })
    .await;

    match flushed {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e).context("Failed to flush local stores"),
        Err(_) => warn!("Store flush timed out after {:?}", FLUSH_TIMEOUT),
    }

    info!("Shutting down daemon");
    Ok(())
}

/// Resolve when SIGTERM or SIGINT arrives
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to set up signal handlers ({}), falling back to CTRL-C", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to wait for CTRL-C: {}", e);
            }
            return;
        }
    };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", name);
}

/// Resolve on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => error!("Failed to wait for CTRL-C: {}", e),
    }
}
