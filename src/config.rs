//! Session configuration for the annotation client

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::batch::MAX_QUERY;
use crate::client::Method;
use crate::error::FerroError;

/// Default service endpoint
pub const DEFAULT_URL: &str = "http://myvariant.info/v1";

/// Settings read at the start of every client operation
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```toml
/// url = "https://myvariant.info/v1"
/// step = 500
/// delay = 0.5
///
/// [cache]
/// enabled = true
/// name = "myvariant_cache"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Service base URL (default: "http://myvariant.info/v1")
    pub url: String,
    /// Terms per batch request (default: 1000, capped at 1000)
    pub step: usize,
    /// Pause between batch requests in seconds (default: 1.0)
    pub delay: f64,
    /// Skip the pause when a call fits in one batch (default: false)
    pub skip_single_batch_delay: bool,
    /// Turn non-2xx responses into errors (default: true)
    ///
    /// When false, single-variant lookups return nothing instead.
    pub raise_for_status: bool,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// User agent override (default: "ferro-myvariant/<version>")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Response cache settings
    pub cache: CacheConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            step: MAX_QUERY,
            delay: 1.0,
            skip_single_batch_delay: false,
            raise_for_status: true,
            timeout_seconds: 30,
            user_agent: None,
            cache: CacheConfig::default(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache responses from the start of the session (default: false)
    pub enabled: bool,
    /// Cache name (default: "myvariant_cache")
    pub name: String,
    /// Maximum number of cached responses (default: 1024)
    pub capacity: usize,
    /// Methods whose responses are cached (default: GET and POST)
    pub methods: Vec<Method>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "myvariant_cache".to_string(),
            capacity: 1024,
            methods: vec![Method::Get, Method::Post],
        }
    }
}

impl SessionConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), FerroError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Inter-batch delay as a duration
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), FerroError> {
        if self.base_url().is_empty() {
            return Err(config_error("url must not be empty"));
        }
        if self.step == 0 {
            return Err(config_error("step must be greater than 0"));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(config_error(format!(
                "delay must be a non-negative number of seconds, got {}",
                self.delay
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(config_error("timeout_seconds must be greater than 0"));
        }
        Ok(())
    }
}

fn config_error(msg: impl Into<String>) -> FerroError {
    FerroError::Config { msg: msg.into() }
}
