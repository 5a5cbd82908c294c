//! Alertify
//!
//! HTTP listener that receives Alertmanager webhooks and forwards each alert
//! to Gotify through the alert processor.

use alert_processor::{AlertProcessor, ProcessorPolicy};
use axum::{
    routing::{get, post},
    Router,
};
use gotify_client::{GotifyClient, GotifyError, MessageBackend};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod routes;

pub use crate::config::{AlertifyConfig, ConfigError};
pub use routes::alerts::{AlertResponse, AlertmanagerWebhook};

/// Application state shared across handlers
pub struct AppState {
    /// Alert processor
    pub processor: AlertProcessor,
    /// Gotify backend, also used for health checks
    pub gotify: Arc<dyn MessageBackend>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state around a backend
    pub fn new(gotify: Arc<dyn MessageBackend>, policy: ProcessorPolicy) -> Self {
        Self {
            processor: AlertProcessor::new(gotify.clone(), policy),
            gotify,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Build state with a Gotify client described by `config`
    pub fn from_config(config: &AlertifyConfig) -> Result<Self, GotifyError> {
        let client = GotifyClient::new(
            &config.gotify_url_prefix,
            &config.gotify_key_app,
            Some(config.gotify_key_client.as_str()),
            config.gotify_timeout(),
        )?;
        Ok(Self::new(Arc::new(client), config.policy()))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/alert", post(routes::alerts::receive_alerts))
        .route("/healthcheck", get(routes::health::healthcheck))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging at the given level
pub fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the server until it fails
pub async fn run_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let app = create_router(state);

    info!("Listening for Alertmanager webhooks on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
