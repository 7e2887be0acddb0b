//! Presence engine
//!
//! Real-time "active users" service for the ticketing platform:
//! - Session heartbeats with staleness-based expiry
//! - Total and event-scoped active counts
//! - Background reaper for long-silent sessions

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use presence_core::PresenceTiming;
use presence_store::{MemoryStore, PresenceStore};
use telemetry::{health, init_tracing_from_env};
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    presence: PresenceTiming,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            presence: PresenceTiming::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting presence engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    info!(
        heartbeat_secs = config.presence.heartbeat_secs,
        staleness_secs = config.presence.staleness_secs,
        reaper_secs = config.presence.reaper_secs,
        "Loaded presence timing"
    );

    // The session table lives in process; presence data is ephemeral
    let store: Arc<dyn PresenceStore> = Arc::new(MemoryStore::new());
    health().store.set_healthy();

    // Start background workers
    let worker_scheduler = Arc::new(WorkerScheduler::new(
        WorkerConfig::from_timing(&config.presence),
        store.clone(),
        config.presence.clone(),
    ));
    let _worker_handles = worker_scheduler.start();

    // Create application state and router
    let state = AppState::new(store, config.presence.clone());
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("PRESENCE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested timing config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(secs) = std::env::var("PRESENCE_HEARTBEAT_SECS") {
        config.presence.heartbeat_secs = secs.parse().context("Invalid PRESENCE_HEARTBEAT_SECS")?;
    }
    if let Ok(secs) = std::env::var("PRESENCE_STALENESS_SECS") {
        config.presence.staleness_secs = secs.parse().context("Invalid PRESENCE_STALENESS_SECS")?;
    }
    if let Ok(secs) = std::env::var("PRESENCE_POLL_SECS") {
        config.presence.poll_secs = secs.parse().context("Invalid PRESENCE_POLL_SECS")?;
    }
    if let Ok(secs) = std::env::var("PRESENCE_REAPER_SECS") {
        config.presence.reaper_secs = secs.parse().context("Invalid PRESENCE_REAPER_SECS")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
