//! Gotify Message Types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message as stored by the Gotify server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GotifyMessage {
    /// Server assigned identifier
    pub id: u64,
    /// Owning application
    #[serde(default)]
    pub appid: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub priority: i64,
    /// Free-form extras; alertify stores its fingerprint under `alertify`
    #[serde(default)]
    pub extras: Option<Value>,
    #[serde(default)]
    pub date: Option<String>,
}

impl GotifyMessage {
    /// The alert fingerprint stored at `extras.alertify.fingerprint`.
    ///
    /// Returns `None` when any level is missing or the value is not a string.
    pub fn fingerprint(&self) -> Option<&str> {
        self.extras
            .as_ref()?
            .get("alertify")?
            .get("fingerprint")?
            .as_str()
    }
}

/// Body of a create-message request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub title: String,
    pub message: String,
    pub priority: i64,
    pub extras: PayloadExtras,
}

/// Extras attached to every message this bridge creates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadExtras {
    pub alertify: AlertifyExtras,
}

/// Correlation data used to find a message again when its alert resolves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertifyExtras {
    /// Serialized as `null` when the alert carried no fingerprint
    pub fingerprint: Option<String>,
}
