//! Client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```
//! use std::time::Duration;
//! use tourdesk::ClientConfig;
//!
//! let config = ClientConfig::from_toml_str(
//!     r#"
//!     base_url = "https://tours.example.com/api"
//!     delete_window_ms = 5000
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.windows().delete, Duration::from_millis(5000));
//! assert_eq!(config.windows().create, Duration::from_millis(2000));
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST service root (default: http://localhost:8080)
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when set
    pub bearer_token: Option<String>,
    /// Undo window for deletes (default: 3000)
    pub delete_window_ms: u64,
    /// Undo window for creates (default: 2000)
    pub create_window_ms: u64,
    /// How long outcome notices stay up (default: 2000)
    pub notice_ms: u64,
    /// Per-request timeout (default: 10000)
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            bearer_token: None,
            delete_window_ms: 3000,
            create_window_ms: 2000,
            notice_ms: 2000,
            request_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&input)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_delete_window(mut self, window: Duration) -> Self {
        self.delete_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_create_window(mut self, window: Duration) -> Self {
        self.create_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn windows(&self) -> GraceWindows {
        GraceWindows {
            delete: Duration::from_millis(self.delete_window_ms),
            create: Duration::from_millis(self.create_window_ms),
        }
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reject values that would make the client unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.delete_window_ms == 0 || self.create_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "grace windows must be greater than zero".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Undo windows per intent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraceWindows {
    pub delete: Duration,
    pub create: Duration,
}

impl Default for GraceWindows {
    fn default() -> Self {
        ClientConfig::default().windows()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "could not read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "invalid config file: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
