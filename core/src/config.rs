//! Client configuration.
//!
//! The configuration is an explicit value handed to `KankaClient::new`.
//! `from_env` is a convenience for binaries; the library never reads the
//! environment on its own.

use std::fmt;

use thiserror::Error;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.kanka.io/1.0";

/// Environment variable holding the personal access token.
pub const API_KEY_VAR: &str = "KANKA_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "KANKA_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is blank")]
    BlankVar(&'static str),
}

/// Base URL and API key for one client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
}

impl ClientConfig {
    /// Configuration for the production host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Reads `KANKA_API_KEY` and, optionally, `KANKA_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injected variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::BlankVar(API_KEY_VAR));
        }
        let config = Self::new(api_key.trim());
        match lookup(BASE_URL_VAR) {
            Some(url) if !url.trim().is_empty() => Ok(config.with_base_url(url.trim())),
            _ => Ok(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// The key stays out of debug output and therefore out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
