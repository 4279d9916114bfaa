//! Client configuration loaded from environment variables.

use std::env;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the chat backend (no trailing slash)
    pub api_base: String,
    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of requests parked while a token refresh is in flight
    pub refresh_queue_cap: usize,
}

impl Default for ClientConfig {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            refresh_queue_cap: 32,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_base: env::var("PDFCHAT_API_BASE")
                .map_err(|_| ConfigError::Missing("PDFCHAT_API_BASE"))?
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: env::var("PDFCHAT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            refresh_queue_cap: env::var("PDFCHAT_REFRESH_QUEUE_CAP")
                .unwrap_or_else(|_| "32".to_string())
                .parse()
                .unwrap_or(32),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
