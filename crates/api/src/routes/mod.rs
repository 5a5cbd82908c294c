//! HTTP Routes

pub mod alerts;
pub mod health;

use axum::http::StatusCode;

/// HTTP status for a call result; values outside the HTTP range become 503
fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
}
