//! Alertmanager Alert Model
//!
//! One element of the `alerts` list in an Alertmanager webhook. Optional
//! fields are read through accessors that document their default or
//! failure behavior.

use crate::error::AlertError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity used when `labels.severity` is absent
pub const DEFAULT_SEVERITY: &str = "warning";

/// Priority used when `labels.priority` is absent
pub const DEFAULT_PRIORITY: i64 = 5;

/// Alert lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

/// A single alert event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Absent status is malformed input, reported when the alert is processed
    #[serde(default)]
    pub status: Option<AlertStatus>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub annotations: Option<HashMap<String, String>>,
    /// Stable identity across the firing/resolved lifecycle
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default, rename = "startsAt")]
    pub starts_at: Option<String>,
    #[serde(default, rename = "endsAt")]
    pub ends_at: Option<String>,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: Option<String>,
}

impl Alert {
    /// Create an alert with empty labels and annotations
    pub fn new(status: AlertStatus) -> Self {
        Self {
            status: Some(status),
            labels: Some(HashMap::new()),
            annotations: Some(HashMap::new()),
            fingerprint: None,
            starts_at: None,
            ends_at: None,
            generator_url: None,
        }
    }

    /// Add or replace a label
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Add or replace an annotation
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Set the fingerprint
    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    /// Lifecycle state. Fails with `MissingField("status")` when absent.
    pub fn status(&self) -> Result<AlertStatus, AlertError> {
        self.status.ok_or(AlertError::MissingField("status"))
    }

    /// Label mapping. Fails with `MissingField("labels")` when absent.
    pub fn labels(&self) -> Result<&HashMap<String, String>, AlertError> {
        self.labels.as_ref().ok_or(AlertError::MissingField("labels"))
    }

    /// Annotation mapping. Fails with `MissingField("annotations")` when absent.
    pub fn annotations(&self) -> Result<&HashMap<String, String>, AlertError> {
        self.annotations
            .as_ref()
            .ok_or(AlertError::MissingField("annotations"))
    }

    /// `labels.severity`, defaulting to [`DEFAULT_SEVERITY`]
    pub fn severity(&self) -> Result<&str, AlertError> {
        Ok(self
            .labels()?
            .get("severity")
            .map(String::as_str)
            .unwrap_or(DEFAULT_SEVERITY))
    }

    /// `labels.instance`; an empty value counts as absent
    pub fn instance(&self) -> Result<Option<&str>, AlertError> {
        Ok(self
            .labels()?
            .get("instance")
            .map(String::as_str)
            .filter(|instance| !instance.is_empty()))
    }

    /// `labels.priority` as an integer, defaulting to [`DEFAULT_PRIORITY`].
    ///
    /// A value that does not parse as an integer is malformed input.
    pub fn priority(&self) -> Result<i64, AlertError> {
        match self.labels()?.get("priority") {
            None => Ok(DEFAULT_PRIORITY),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AlertError::InvalidPriority(raw.clone())),
        }
    }

    /// `annotations.summary`; required
    pub fn summary(&self) -> Result<&str, AlertError> {
        self.annotations()?
            .get("summary")
            .map(String::as_str)
            .ok_or(AlertError::MissingField("summary"))
    }

    /// `annotations.description`, defaulting to an empty string
    pub fn description(&self) -> Result<&str, AlertError> {
        Ok(self
            .annotations()?
            .get("description")
            .map(String::as_str)
            .unwrap_or_default())
    }

    /// Fingerprint, if Alertmanager supplied one
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}
