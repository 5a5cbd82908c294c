//! Alert Error Types

use thiserror::Error;

/// Malformed alert input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    /// A required mapping or key is absent
    #[error("missing field: '{0}'")]
    MissingField(&'static str),

    /// `labels.priority` is present but not an integer
    #[error("missing field: 'priority' (not an integer: {0:?})")]
    InvalidPriority(String),
}
