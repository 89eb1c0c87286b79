//! Configuration for the HTTP transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating an [`HttpTransportConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this type.
    #[error("Transport configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but one of its values is unusable.
    #[error("Transport configuration is invalid: {message}")]
    Invalid {
        /// Description of the rejected value.
        message: String,
    },
}

/// How the HTTP transport reaches a query service.
///
/// Every field has a default, so a partial (or empty) JSON document is
/// accepted:
///
/// ```json
/// { "scheme": "https", "connect_timeout_secs": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Scheme used when the endpoint is a bare `host:port`. `"http"` or `"https"`.
    pub scheme: String,

    /// Upper bound on establishing a TCP/TLS connection, in seconds.
    ///
    /// Independent of the per-call timeout given to the adapter.
    pub connect_timeout_secs: u32,

    /// Path, relative to the endpoint, that accepts query submissions.
    pub query_path: String,

    /// Path, relative to the endpoint, that serves result pages.
    pub results_path: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            connect_timeout_secs: 10,
            query_path: "query".to_string(),
            results_path: "results".to_string(),
        }
    }
}

impl HttpTransportConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(invalid(format!(
                "scheme must be \"http\" or \"https\", got \"{}\"",
                self.scheme
            )));
        }
        if self.connect_timeout_secs == 0 {
            return Err(invalid("connect_timeout_secs must be at least 1"));
        }
        for (name, path) in [
            ("query_path", &self.query_path),
            ("results_path", &self.results_path),
        ] {
            if path.trim_matches('/').is_empty() {
                return Err(invalid(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// The connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}
