//! Alertify Configuration
//!
//! Values come from, in increasing precedence: built-in defaults, a YAML
//! file, and environment variables named after the upper-cased field.

use alert_processor::ProcessorPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML file exists but could not be read or decoded
    #[error("Failed to load config file {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: ::config::ConfigError,
    },

    /// An environment override could not be parsed for its field
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

/// Alertify configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertifyConfig {
    /// Delete a resolved alert's messages instead of posting "[RESOLVED]"
    pub delete_onresolve: bool,
    /// Drop resolved alerts entirely
    pub disable_resolved: bool,
    /// Gotify application key (sending)
    pub gotify_key_app: String,
    /// Gotify client key (listing and deleting); empty disables both
    pub gotify_key_client: String,
    /// Gotify base URL
    pub gotify_url_prefix: String,
    /// Per-request timeout towards Gotify (seconds)
    pub gotify_timeout_secs: u64,
    /// Port the webhook listener binds to
    pub listen_port: u16,
    /// 0 = warnings, 1 = info, 2+ = debug
    pub verbose: u8,
}

impl Default for AlertifyConfig {
    fn default() -> Self {
        Self {
            delete_onresolve: false,
            disable_resolved: false,
            gotify_key_app: String::new(),
            gotify_key_client: String::new(),
            gotify_url_prefix: "http://localhost".to_string(),
            gotify_timeout_secs: gotify_client::DEFAULT_TIMEOUT_SECS,
            listen_port: 8080,
            verbose: 0,
        }
    }
}

/// One environment override: variable name, how to show the current value,
/// and how to parse a new one into the config.
struct EnvOverride {
    var: &'static str,
    show: fn(&AlertifyConfig) -> String,
    apply: fn(&mut AlertifyConfig, &str) -> Option<()>,
}

const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: "DELETE_ONRESOLVE",
        show: |c| c.delete_onresolve.to_string(),
        apply: |c, v| {
            c.delete_onresolve = parse_bool(v)?;
            Some(())
        },
    },
    EnvOverride {
        var: "DISABLE_RESOLVED",
        show: |c| c.disable_resolved.to_string(),
        apply: |c, v| {
            c.disable_resolved = parse_bool(v)?;
            Some(())
        },
    },
    EnvOverride {
        var: "GOTIFY_KEY_APP",
        show: |c| c.gotify_key_app.clone(),
        apply: |c, v| {
            c.gotify_key_app = v.to_string();
            Some(())
        },
    },
    EnvOverride {
        var: "GOTIFY_KEY_CLIENT",
        show: |c| c.gotify_key_client.clone(),
        apply: |c, v| {
            c.gotify_key_client = v.to_string();
            Some(())
        },
    },
    EnvOverride {
        var: "GOTIFY_URL_PREFIX",
        show: |c| c.gotify_url_prefix.clone(),
        apply: |c, v| {
            c.gotify_url_prefix = v.to_string();
            Some(())
        },
    },
    EnvOverride {
        var: "GOTIFY_TIMEOUT_SECS",
        show: |c| c.gotify_timeout_secs.to_string(),
        apply: |c, v| {
            c.gotify_timeout_secs = v.trim().parse().ok()?;
            Some(())
        },
    },
    EnvOverride {
        var: "LISTEN_PORT",
        show: |c| c.listen_port.to_string(),
        apply: |c, v| {
            c.listen_port = v.trim().parse().ok()?;
            Some(())
        },
    },
    EnvOverride {
        var: "VERBOSE",
        show: |c| c.verbose.to_string(),
        apply: |c, v| {
            c.verbose = v.trim().parse().ok()?;
            Some(())
        },
    },
];

/// Accepts the usual truthy/falsy spellings (y/yes/t/true/on/1, n/no/f/false/off/0)
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl AlertifyConfig {
    /// Load defaults, then `path` if it exists, then environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.is_file() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Read a YAML file; keys not present keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let name = path.to_string_lossy();
        ::config::Config::builder()
            .add_source(::config::File::new(&name, ::config::FileFormat::Yaml))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|source| ConfigError::Load {
                path: name.to_string(),
                source,
            })
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for entry in ENV_OVERRIDES {
            if let Some(value) = lookup(entry.var) {
                (entry.apply)(&mut *self, &value).ok_or_else(|| ConfigError::InvalidValue {
                    var: entry.var,
                    value: value.clone(),
                })?;
            }
        }
        Ok(())
    }

    /// Resolved-alert policy for the processor
    pub fn policy(&self) -> ProcessorPolicy {
        ProcessorPolicy {
            disable_resolved: self.disable_resolved,
            delete_onresolve: self.delete_onresolve,
        }
    }

    /// Gotify request timeout
    pub fn gotify_timeout(&self) -> Duration {
        Duration::from_secs(self.gotify_timeout_secs)
    }

    /// Maximum log level for the configured verbosity
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

/// Help text listing every environment override and its default
pub fn env_help() -> String {
    let defaults = AlertifyConfig::default();
    let width = ENV_OVERRIDES
        .iter()
        .map(|entry| entry.var.len())
        .max()
        .unwrap_or_default();

    let lines: Vec<String> = ENV_OVERRIDES
        .iter()
        .map(|entry| {
            let value = (entry.show)(&defaults);
            format!(
                "  * {:width$} (default: {})",
                entry.var,
                if value.is_empty() { "None" } else { value.as_str() },
                width = width
            )
        })
        .collect();

    format!(
        "The following environment variables will override any config or default:\n{}",
        lines.join("\n")
    )
}
