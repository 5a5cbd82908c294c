//! Alert Routes

use alert_processor::Alert;
use axum::{extract::State, http::StatusCode, Json};
use gotify_client::CallResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::status_code;
use crate::AppState;

/// Alertmanager webhook envelope; only `alerts` is acted upon.
///
/// Alerts are kept as raw JSON so that one undecodable alert is reported in
/// its own result instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertmanagerWebhook {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "groupKey")]
    pub group_key: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default, rename = "groupLabels")]
    pub group_labels: HashMap<String, String>,
    #[serde(default, rename = "commonLabels")]
    pub common_labels: HashMap<String, String>,
    #[serde(default, rename = "commonAnnotations")]
    pub common_annotations: HashMap<String, String>,
    #[serde(default, rename = "externalURL")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub alerts: Vec<Value>,
}

/// Response for the alert endpoint, one result per alert in order
#[derive(Debug, Serialize, Deserialize)]
pub struct AlertResponse {
    pub results: Vec<CallResult>,
}

/// Receive a webhook and process its alerts one at a time
pub async fn receive_alerts(
    State(state): State<Arc<AppState>>,
    Json(webhook): Json<AlertmanagerWebhook>,
) -> (StatusCode, Json<AlertResponse>) {
    info!(
        "Received {} alert(s) from receiver {:?} (group {:?})",
        webhook.alerts.len(),
        webhook.receiver,
        webhook.group_key
    );

    let mut results = Vec::with_capacity(webhook.alerts.len());
    for raw in webhook.alerts {
        let result = match serde_json::from_value::<Alert>(raw) {
            Ok(alert) => state.processor.process(&alert).await,
            Err(e) => CallResult::bad_request(format!("invalid alert: {}", e)),
        };
        if !result.is_success() {
            warn!("Alert failed with {}: {}", result.status, result.reason);
        }
        results.push(result);
    }

    let status = results
        .iter()
        .find(|result| !result.is_success())
        .map(|result| status_code(result.status))
        .unwrap_or(StatusCode::OK);

    (status, Json(AlertResponse { results }))
}
