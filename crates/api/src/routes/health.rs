//! Health Routes

use axum::{extract::State, http::StatusCode, Json};
use gotify_client::CallResult;
use std::sync::Arc;
use tracing::debug;

use super::status_code;
use crate::AppState;

/// Pass the Gotify health check through
pub async fn healthcheck(State(state): State<Arc<AppState>>) -> (StatusCode, Json<CallResult>) {
    let result = state.gotify.healthcheck().await;
    debug!(
        "Gotify health: {} {} (alertify {}, up {}s)",
        result.status,
        result.reason,
        state.version,
        state.start_time.elapsed().as_secs()
    );
    (status_code(result.status), Json(result))
}
