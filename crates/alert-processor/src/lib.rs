//! Alert Processing
//!
//! Turns one Alertmanager alert into at most one Gotify operation:
//! create a message, delete the messages of a resolved alert, or do nothing.
//! Messages are correlated to alerts through the fingerprint stored in
//! `extras.alertify.fingerprint`.

mod alert;
mod error;
mod processor;

pub use alert::{Alert, AlertStatus, DEFAULT_PRIORITY, DEFAULT_SEVERITY};
pub use error::AlertError;
pub use processor::{
    build_payload, AlertProcessor, ProcessorPolicy, DELETION_COMPLETE, RESOLVED_IGNORED,
    RESOLVED_PREFIX,
};
