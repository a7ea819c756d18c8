//! Orchestrator configuration
//!
//! Only the orchestrator is configurable; the compiler and the validator take
//! no settings.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bound on the knowledge-service call
pub const DEFAULT_CANON_TIMEOUT_MS: u64 = 90_000;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Knowledge-service bound in milliseconds
    pub canon_timeout_ms: u64,
    /// Root directory for persisted artifacts
    pub output_dir: PathBuf,
    /// Whether finished runs are persisted
    pub persist: bool,
    /// HTTP knowledge-service endpoint, if any
    pub knowledge_endpoint: Option<String>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            canon_timeout_ms: DEFAULT_CANON_TIMEOUT_MS,
            output_dir: PathBuf::from("skills"),
            persist: true,
            knowledge_endpoint: None,
        }
    }
}

impl ForgeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With knowledge-service bound
    #[inline]
    #[must_use]
    pub fn with_canon_timeout(mut self, timeout: Duration) -> Self {
        self.canon_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With persistence switched on or off
    #[inline]
    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// With HTTP knowledge-service endpoint
    #[inline]
    #[must_use]
    pub fn with_knowledge_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.knowledge_endpoint = Some(endpoint.into());
        self
    }

    /// Knowledge-service bound
    #[inline]
    #[must_use]
    pub fn canon_timeout(&self) -> Duration {
        Duration::from_millis(self.canon_timeout_ms)
    }

    /// Parse and validate TOML; missing keys take their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`ForgeConfig::from_toml_str`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canon_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "canon_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.persist && self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_dir",
                reason: "required when persist is enabled".to_string(),
            });
        }
        if let Some(endpoint) = &self.knowledge_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    field: "knowledge_endpoint",
                    reason: format!("'{endpoint}' is not an http(s) URL"),
                });
            }
        }
        Ok(())
    }
}
