//! Message Backend Abstraction

use crate::message::MessagePayload;
use crate::result::CallResult;
use async_trait::async_trait;

/// The four Gotify operations the alert pipeline relies on.
///
/// Implementations never fail with an error: every outcome, including an
/// unreachable server, is reported through [`CallResult`].
#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// List existing messages; `json.messages` holds the entries
    async fn list_messages(&self) -> CallResult;

    /// Create a message
    async fn send_message(&self, payload: &MessagePayload) -> CallResult;

    /// Delete a message by id
    async fn delete_message(&self, id: u64) -> CallResult;

    /// Probe server health; only `status == 200` counts as healthy
    async fn healthcheck(&self) -> CallResult;
}
