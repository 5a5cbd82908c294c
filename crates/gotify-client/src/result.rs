//! Normalized Call Results

use crate::message::GotifyMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Uniform outcome of a backend call or of alert processing
///
/// `status` follows HTTP conventions: backend codes pass through verbatim,
/// transport failures are reported as 503 (or 504 on timeout), and
/// malformed input is reported as 400.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// HTTP-style status code
    pub status: u16,
    /// Human readable reason
    pub reason: String,
    /// Parsed response body, if any
    #[serde(default)]
    pub json: Option<Value>,
}

impl CallResult {
    /// Create a result without a body
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            json: None,
        }
    }

    /// 200 result with the given reason
    pub fn ok(reason: impl Into<String>) -> Self {
        Self::new(200, reason)
    }

    /// 400 result with the given reason
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(400, reason)
    }

    /// Attach a structured body
    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode `json.messages` into Gotify messages.
    ///
    /// Entries that cannot be decoded are skipped with a warning. A missing
    /// body or missing `messages` key yields an empty list.
    pub fn messages(&self) -> Vec<GotifyMessage> {
        let Some(entries) = self
            .json
            .as_ref()
            .and_then(|json| json.get("messages"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("Skipping undecodable message {}: {}", entry, e);
                    None
                }
            })
            .collect()
    }
}
