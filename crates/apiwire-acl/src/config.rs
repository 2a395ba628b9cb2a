//! Decision service configuration.
//!
//! ## Example Configuration
//!
//! ```toml
//! host = "http://localhost:8181"
//! package_name = "/v1/data/apiwire/authz"
//! timeout_seconds = 5
//! max_concurrent_group_lookups = 8
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuthorizationError, Result};

/// Settings for [`AclClient`](crate::AclClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclConfig {
    /// Base URL of the decision service.
    pub host: String,

    /// Policy package path appended verbatim to `host`.
    pub package_name: String,

    /// Request timeout in seconds (default: none)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Upper bound on concurrent group lookups per decision (default: 16)
    #[serde(default = "default_max_concurrent_group_lookups")]
    pub max_concurrent_group_lookups: usize,
}

const fn default_max_concurrent_group_lookups() -> usize {
    16
}

impl AclConfig {
    /// Creates a configuration with default limits.
    pub fn new(host: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            package_name: package_name.into(),
            timeout_seconds: None,
            max_concurrent_group_lookups: default_max_concurrent_group_lookups(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the group lookup concurrency bound.
    #[must_use]
    pub const fn with_max_concurrent_group_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_group_lookups = limit;
        self
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AuthorizationError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AuthorizationError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The host is empty
    /// - The decision URL does not parse
    /// - The group lookup bound is zero
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AuthorizationError::Configuration(
                "Decision service host is empty".to_string(),
            ));
        }

        let url = self.decision_url();
        reqwest::Url::parse(&url).map_err(|e| {
            AuthorizationError::Configuration(format!("Invalid decision URL '{url}': {e}"))
        })?;

        if self.max_concurrent_group_lookups == 0 {
            return Err(AuthorizationError::Configuration(
                "max_concurrent_group_lookups must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the policy package.
    #[must_use]
    pub fn decision_url(&self) -> String {
        format!("{}{}", self.host, self.package_name)
    }
}
