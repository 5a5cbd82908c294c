//! Alert Processor Implementation

use crate::alert::{Alert, AlertStatus};
use crate::error::AlertError;
use gotify_client::{AlertifyExtras, CallResult, MessageBackend, MessagePayload, PayloadExtras};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reason returned when resolved alerts are dropped
pub const RESOLVED_IGNORED: &str = "ignored: resolved disabled";

/// Reason returned once delete-on-resolve has run
pub const DELETION_COMPLETE: &str = "deletion complete";

/// Title prefix for resolved alerts that are posted as new messages
pub const RESOLVED_PREFIX: &str = "resolved";

/// How resolved alerts are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorPolicy {
    /// Drop resolved alerts without contacting Gotify
    pub disable_resolved: bool,
    /// Delete the messages of a resolved alert instead of posting a new one
    pub delete_onresolve: bool,
}

/// Applies the alert lifecycle policy against a message backend
pub struct AlertProcessor {
    backend: Arc<dyn MessageBackend>,
    policy: ProcessorPolicy,
}

impl AlertProcessor {
    /// Create a new processor
    pub fn new(backend: Arc<dyn MessageBackend>, policy: ProcessorPolicy) -> Self {
        info!("Creating alert processor with policy: {:?}", policy);
        Self { backend, policy }
    }

    /// Active policy
    pub fn policy(&self) -> ProcessorPolicy {
        self.policy
    }

    /// Process one alert.
    ///
    /// Malformed alerts yield a 400 result before any backend call. When a
    /// message is sent, the backend's result is returned unchanged.
    pub async fn process(&self, alert: &Alert) -> CallResult {
        let status = match alert.status() {
            Ok(status) => status,
            Err(e) => return reject(e),
        };

        let prefix = match status {
            AlertStatus::Resolved if self.policy.disable_resolved => {
                info!("Ignoring resolved messages");
                return CallResult::ok(RESOLVED_IGNORED);
            }
            AlertStatus::Resolved if self.policy.delete_onresolve => {
                self.delete_matching(alert).await;
                return CallResult::ok(DELETION_COMPLETE);
            }
            AlertStatus::Resolved => RESOLVED_PREFIX,
            AlertStatus::Firing => match alert.severity() {
                Ok(severity) => severity,
                Err(e) => return reject(e),
            },
        };

        match build_payload(alert, prefix) {
            Ok(payload) => self.backend.send_message(&payload).await,
            Err(e) => reject(e),
        }
    }

    /// Ids of existing messages whose stored fingerprint equals the alert's.
    ///
    /// Without an alert fingerprint nothing can be correlated and the backend
    /// is not queried. Messages without a stored fingerprint never match.
    pub async fn find_by_fingerprint(&self, alert: &Alert) -> Vec<u64> {
        let Some(fingerprint) = alert.fingerprint() else {
            debug!("No fingerprint found in new message");
            return Vec::new();
        };

        let listing = self.backend.list_messages().await;
        if !listing.is_success() {
            error!(
                "Could not list messages ({} {}); nothing will be deleted",
                listing.status, listing.reason
            );
            return Vec::new();
        }

        listing
            .messages()
            .iter()
            .filter_map(|message| match message.fingerprint() {
                Some(stored) if stored == fingerprint => Some(message.id),
                Some(_) => None,
                None => {
                    warn!("No fingerprint found in message ID: {}", message.id);
                    None
                }
            })
            .collect()
    }

    /// Best-effort deletion: every match is attempted, failures are only logged
    async fn delete_matching(&self, alert: &Alert) {
        let ids = self.find_by_fingerprint(alert).await;
        let mut failed = 0;

        for id in &ids {
            let result = self.backend.delete_message(*id).await;
            if !result.is_success() {
                failed += 1;
                error!(
                    "There was a problem removing message ID {}: {} {}",
                    id, result.status, result.reason
                );
            }
        }

        info!(
            "Deleted {} of {} messages for fingerprint {:?}",
            ids.len() - failed,
            ids.len(),
            alert.fingerprint()
        );
    }
}

/// Build the Gotify payload for an alert posted under `prefix`
pub fn build_payload(alert: &Alert, prefix: &str) -> Result<MessagePayload, AlertError> {
    let title = format!("[{}] {}", prefix.to_uppercase(), alert.summary()?);
    let message = match alert.instance()? {
        Some(instance) => format!("{}: {}", instance, alert.description()?),
        None => alert.description()?.to_string(),
    };

    Ok(MessagePayload {
        title,
        message,
        priority: alert.priority()?,
        extras: PayloadExtras {
            alertify: AlertifyExtras {
                fingerprint: alert.fingerprint.clone(),
            },
        },
    })
}

fn reject(err: AlertError) -> CallResult {
    error!("Rejecting alert: {}", err);
    CallResult::bad_request(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Send(MessagePayload),
        Delete(u64),
        Health,
    }

    struct MockBackend {
        listing: CallResult,
        send_result: CallResult,
        failing_deletes: Vec<u64>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockBackend {
        fn new(messages: Value) -> Self {
            Self {
                listing: CallResult::ok("OK").with_json(json!({ "messages": messages })),
                send_result: CallResult::ok("OK"),
                failing_deletes: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn deletes(&self) -> Vec<u64> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Delete(id) => Some(id),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl MessageBackend for MockBackend {
        async fn list_messages(&self) -> CallResult {
            self.calls.lock().unwrap().push(Call::List);
            self.listing.clone()
        }

        async fn send_message(&self, payload: &MessagePayload) -> CallResult {
            self.calls.lock().unwrap().push(Call::Send(payload.clone()));
            self.send_result.clone()
        }

        async fn delete_message(&self, id: u64) -> CallResult {
            self.calls.lock().unwrap().push(Call::Delete(id));
            if self.failing_deletes.contains(&id) {
                CallResult::new(404, "Not Found")
            } else {
                CallResult::ok("OK")
            }
        }

        async fn healthcheck(&self) -> CallResult {
            self.calls.lock().unwrap().push(Call::Health);
            CallResult::ok("OK")
        }
    }

    fn processor(backend: &Arc<MockBackend>, policy: ProcessorPolicy) -> AlertProcessor {
        AlertProcessor::new(backend.clone(), policy)
    }

    fn delete_policy() -> ProcessorPolicy {
        ProcessorPolicy {
            delete_onresolve: true,
            ..Default::default()
        }
    }

    fn fingerprinted(id: u64, fingerprint: &str) -> Value {
        json!({"id": id, "extras": {"alertify": {"fingerprint": fingerprint}}})
    }

    fn sent_payload(backend: &MockBackend) -> MessagePayload {
        match backend.calls().as_slice() {
            [Call::Send(payload)] => payload.clone(),
            other => panic!("expected a single send, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_minimal_firing_alert() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let alert: Alert = serde_json::from_value(json!({
            "status": "firing",
            "labels": {},
            "annotations": {"summary": "S"}
        }))
        .unwrap();

        let result = processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        assert_eq!(result, CallResult::ok("OK"));
        let payload = sent_payload(&backend);
        assert_eq!(payload.title, "[WARNING] S");
        assert_eq!(payload.message, "");
        assert_eq!(payload.priority, 5);
        assert_eq!(payload.extras.alertify.fingerprint, None);
    }

    #[tokio::test]
    async fn test_firing_payload_fields() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let alert = Alert::new(AlertStatus::Firing)
            .with_label("severity", "critical")
            .with_label("instance", "db01:9100")
            .with_label("priority", "8")
            .with_annotation("summary", "Disk full")
            .with_annotation("description", "/var at 99%")
            .with_fingerprint("fp-1");

        processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        let payload = sent_payload(&backend);
        assert_eq!(payload.title, "[CRITICAL] Disk full");
        assert_eq!(payload.message, "db01:9100: /var at 99%");
        assert_eq!(payload.priority, 8);
        assert_eq!(payload.extras.alertify.fingerprint.as_deref(), Some("fp-1"));
    }

    #[tokio::test]
    async fn test_send_result_propagated() {
        let mut mock = MockBackend::new(json!([]));
        mock.send_result = CallResult::new(503, "connection error: refused");
        let backend = Arc::new(mock);
        let alert = Alert::new(AlertStatus::Firing).with_annotation("summary", "S");

        let result = processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        assert_eq!(result, CallResult::new(503, "connection error: refused"));
    }

    #[tokio::test]
    async fn test_missing_annotations_rejected() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let alert: Alert =
            serde_json::from_value(json!({"status": "firing", "labels": {}})).unwrap();

        let result = processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        assert_eq!(result, CallResult::bad_request("missing field: 'annotations'"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_inputs_make_no_calls() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let processor = processor(&backend, ProcessorPolicy::default());

        let no_labels: Alert = serde_json::from_value(json!({
            "status": "firing",
            "annotations": {"summary": "S"}
        }))
        .unwrap();
        let result = processor.process(&no_labels).await;
        assert_eq!(result, CallResult::bad_request("missing field: 'labels'"));

        let no_summary = Alert::new(AlertStatus::Firing);
        let result = processor.process(&no_summary).await;
        assert_eq!(result, CallResult::bad_request("missing field: 'summary'"));

        let bad_priority = Alert::new(AlertStatus::Firing)
            .with_label("priority", "urgent")
            .with_annotation("summary", "S");
        let result = processor.process(&bad_priority).await;
        assert_eq!(result.status, 400);
        assert!(result.reason.starts_with("missing field: 'priority'"));

        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_status_rejected() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let alert: Alert = serde_json::from_value(json!({
            "labels": {},
            "annotations": {"summary": "S"}
        }))
        .unwrap();

        let result = processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        assert_eq!(result, CallResult::bad_request("missing field: 'status'"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_disabled_makes_no_calls() {
        let backend = Arc::new(MockBackend::new(json!([fingerprinted(1, "fp-1")])));
        let policy = ProcessorPolicy {
            disable_resolved: true,
            delete_onresolve: true,
        };
        let alert = Alert::new(AlertStatus::Resolved).with_fingerprint("fp-1");

        let result = processor(&backend, policy).process(&alert).await;

        assert_eq!(result, CallResult::ok(RESOLVED_IGNORED));
        assert_eq!(result.reason, "ignored: resolved disabled");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_without_flags_posts_resolved_title() {
        let backend = Arc::new(MockBackend::new(json!([])));
        let alert = Alert::new(AlertStatus::Resolved)
            .with_label("severity", "critical")
            .with_annotation("summary", "Disk full")
            .with_fingerprint("fp-1");

        processor(&backend, ProcessorPolicy::default())
            .process(&alert)
            .await;

        let payload = sent_payload(&backend);
        assert_eq!(payload.title, "[RESOLVED] Disk full");
        assert_eq!(payload.extras.alertify.fingerprint.as_deref(), Some("fp-1"));
    }

    #[tokio::test]
    async fn test_delete_on_resolve_without_matches() {
        let backend = Arc::new(MockBackend::new(json!([
            fingerprinted(1, "other"),
            {"id": 2, "title": "manual"}
        ])));
        let alert = Alert::new(AlertStatus::Resolved).with_fingerprint("fp-1");

        let result = processor(&backend, delete_policy()).process(&alert).await;

        assert_eq!(result, CallResult::ok(DELETION_COMPLETE));
        assert_eq!(backend.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_delete_on_resolve_exact_match_only() {
        let backend = Arc::new(MockBackend::new(json!([
            fingerprinted(5, "fp-1"),
            fingerprinted(4, "fp-10"),
            {"id": 3, "title": "no extras"},
            {"id": 2, "extras": {"alertify": {}}},
            fingerprinted(1, "fp-1")
        ])));
        let alert = Alert::new(AlertStatus::Resolved).with_fingerprint("fp-1");

        let result = processor(&backend, delete_policy()).process(&alert).await;

        assert_eq!(result, CallResult::ok(DELETION_COMPLETE));
        assert_eq!(backend.deletes(), vec![5, 1]);
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_abort() {
        let mut mock = MockBackend::new(json!([
            fingerprinted(7, "fp-1"),
            fingerprinted(8, "fp-1")
        ]));
        mock.failing_deletes = vec![7];
        let backend = Arc::new(mock);
        let alert = Alert::new(AlertStatus::Resolved).with_fingerprint("fp-1");

        let result = processor(&backend, delete_policy()).process(&alert).await;

        assert_eq!(result, CallResult::ok(DELETION_COMPLETE));
        assert_eq!(backend.deletes(), vec![7, 8]);
    }

    #[tokio::test]
    async fn test_alert_without_fingerprint_skips_lookup() {
        let backend = Arc::new(MockBackend::new(json!([fingerprinted(1, "fp-1")])));
        let alert = Alert::new(AlertStatus::Resolved);

        let result = processor(&backend, delete_policy()).process(&alert).await;

        assert_eq!(result, CallResult::ok(DELETION_COMPLETE));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_listing_deletes_nothing() {
        let mut mock = MockBackend::new(json!([]));
        mock.listing = CallResult::new(401, "Unauthorized");
        let backend = Arc::new(mock);
        let alert = Alert::new(AlertStatus::Resolved).with_fingerprint("fp-1");

        let processor = processor(&backend, delete_policy());
        assert!(processor.find_by_fingerprint(&alert).await.is_empty());
        assert_eq!(
            processor.process(&alert).await,
            CallResult::ok(DELETION_COMPLETE)
        );
        assert!(backend.deletes().is_empty());
    }

    #[test]
    fn test_build_payload_uppercases_prefix() {
        let alert = Alert::new(AlertStatus::Firing)
            .with_label("instance", "")
            .with_annotation("summary", "Load high");
        let payload = build_payload(&alert, "info").unwrap();
        assert_eq!(payload.title, "[INFO] Load high");
        assert_eq!(payload.message, "");
    }
}
