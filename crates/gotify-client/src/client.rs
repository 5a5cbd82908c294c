//! Gotify REST Client
//!
//! Wraps the Gotify HTTP API. Read-side calls (list, delete, health) carry
//! the client key, message creation carries the application key.

use crate::backend::MessageBackend;
use crate::error::GotifyError;
use crate::message::MessagePayload;
use crate::result::CallResult;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Header carrying either the application or the client key
pub const KEY_HEADER: &str = "X-Gotify-Key";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Client for a single Gotify server
pub struct GotifyClient {
    /// Base URL, without trailing slash (e.g., "http://localhost")
    url_prefix: String,
    /// Application key, used to create messages
    app_key: String,
    /// Client key, used to read and delete messages
    client_key: Option<String>,
    http: reqwest::Client,
}

impl GotifyClient {
    /// Create a new Gotify client
    ///
    /// # Arguments
    /// * `url_prefix` - Base URL of the Gotify server
    /// * `app_key` - Application key for sending messages
    /// * `client_key` - Client key for listing/deleting; empty means none
    /// * `timeout` - Bound applied to every request
    pub fn new(
        url_prefix: &str,
        app_key: &str,
        client_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, GotifyError> {
        let url_prefix = url_prefix.trim_end_matches('/');
        if !(url_prefix.starts_with("http://") || url_prefix.starts_with("https://")) {
            return Err(GotifyError::InvalidUrl(url_prefix.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        info!("Creating Gotify client for {}", url_prefix);
        Ok(Self {
            url_prefix: url_prefix.to_string(),
            app_key: app_key.to_string(),
            client_key: client_key
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            http,
        })
    }

    /// Base URL requests are sent to
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Whether a client key is configured
    pub fn has_client_key(&self) -> bool {
        self.client_key.is_some()
    }

    fn key_for(&self, method: &Method) -> &str {
        if *method == Method::GET || *method == Method::DELETE {
            self.client_key.as_deref().unwrap_or_default()
        } else {
            self.app_key.as_str()
        }
    }

    /// Issue one request and normalize whatever happens into a `CallResult`
    async fn call(&self, method: Method, path: &str, body: Option<&MessagePayload>) -> CallResult {
        let url = format!("{}{}", self.url_prefix, path);
        debug!("Sending {} {} with payload {:?}", method, url, body);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(KEY_HEADER, self.key_for(&method));
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(&method, &url, &e),
        };

        let status = response.status();
        let mut result = CallResult::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
        );

        match response.bytes().await {
            Ok(bytes) if !bytes.is_empty() => match serde_json::from_slice(&bytes) {
                Ok(json) => result.json = Some(json),
                Err(e) => error!("Could not parse JSON from {} {}: {}", method, url, e),
            },
            Ok(_) => {}
            Err(e) => return transport_failure(&method, &url, &e),
        }

        debug!(
            "Gotify returned status {}, reason {:?}, body {:?}",
            result.status, result.reason, result.json
        );
        result
    }
}

#[async_trait]
impl MessageBackend for GotifyClient {
    async fn list_messages(&self) -> CallResult {
        if self.client_key.is_none() {
            warn!("No client key is configured. No messages could be retrieved.");
            return CallResult::ok("No client key configured").with_json(json!({ "messages": [] }));
        }
        debug!("Fetching existing messages from Gotify");
        self.call(Method::GET, "/message", None).await
    }

    async fn send_message(&self, payload: &MessagePayload) -> CallResult {
        debug!("Sending message to Gotify");
        self.call(Method::POST, "/message", Some(payload)).await
    }

    async fn delete_message(&self, id: u64) -> CallResult {
        debug!("Deleting message ID: {}", id);
        self.call(Method::DELETE, &format!("/message/{}", id), None)
            .await
    }

    async fn healthcheck(&self) -> CallResult {
        self.call(Method::GET, "/health", None).await
    }
}

/// Map a reqwest failure onto the result shape used for HTTP responses
fn transport_failure(method: &Method, url: &str, err: &reqwest::Error) -> CallResult {
    let detail = error_chain(err);
    error!("{} {} failed: {}", method, url, detail);

    if err.is_timeout() {
        CallResult::new(504, format!("timeout: {}", detail))
    } else if err.is_connect() {
        CallResult::new(503, format!("connection error: {}", detail))
    } else {
        CallResult::new(503, format!("request error: {}", detail))
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
