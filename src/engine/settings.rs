use crate::engine::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Base URL of the ConvertKit API
pub const DEFAULT_BASE_URL: &str = "https://api.convertkit.com";

/// Every request is a single attempt bounded by this timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Plugin-level settings: API credentials and request behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Log every request and response at debug level
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Settings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: String::new(),
            debug: false,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(FeedError::from_serde)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json_str = fs::read_to_string(path).map_err(FeedError::from_io)?;
        Self::from_json(&json_str)
    }

    /// Read settings from `CONVERTKIT_API_KEY`, `CONVERTKIT_API_SECRET`,
    /// `CONVERTKIT_DEBUG` and `CONVERTKIT_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("CONVERTKIT_API_KEY")
            .map_err(|_| FeedError::Config("CONVERTKIT_API_KEY is not set".to_string()))?;

        let mut settings = Settings::new(api_key);
        settings.api_secret = env::var("CONVERTKIT_API_SECRET").unwrap_or_default();
        settings.debug = env::var("CONVERTKIT_DEBUG")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        if let Ok(base_url) = env::var("CONVERTKIT_BASE_URL") {
            settings.base_url = base_url;
        }

        Ok(settings)
    }
}
