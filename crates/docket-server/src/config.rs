//! Configuration file parsing for the server
//!
//! Loads settings from a TOML file: bind address, database and blob-store
//! paths, session lifetime, and model settings. The model API key is NOT
//! part of the file; it comes from the `GEMINI_API_KEY` environment
//! variable at startup.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("missing required configuration field: {0}")]
    MissingField(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Root directory for stored document blobs
    pub blob_root: String,

    /// Session lifetime in seconds (default: 7 days)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Minimum extracted-text length a non-native upload must reach
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Model settings
    #[serde(default)]
    pub llm: LlmSettings,
}

/// Model client settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Model name (default: gemini-2.5-flash)
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the REST endpoint (proxies, test servers)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-HTTP-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempt budget per call (1 = no retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Overall deadline for one analysis call in seconds
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: None,
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            analysis_timeout_secs: default_analysis_timeout(),
        }
    }
}

/// Default session lifetime: 7 days, matching the cookie
fn default_session_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_min_text_chars() -> usize {
    docket_intake::DEFAULT_MIN_TEXT_CHARS
}

fn default_model() -> String {
    docket_llm::gemini::DEFAULT_MODEL.to_string()
}

fn default_request_timeout() -> u64 {
    docket_llm::gemini::DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    docket_llm::gemini::DEFAULT_MAX_ATTEMPTS
}

fn default_analysis_timeout() -> u64 {
    120
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;

        if config.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        if config.blob_root.is_empty() {
            return Err(ConfigError::MissingField("blob_root".to_string()));
        }

        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: "docket.db".to_string(),
            blob_root: "data".to_string(),
            session_ttl_secs: default_session_ttl(),
            min_text_chars: default_min_text_chars(),
            llm: LlmSettings::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.session_ttl_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.min_text_chars, 50);
        assert_eq!(config.llm.max_attempts, 2);
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/docket/docket.db"
            blob_root = "/var/lib/docket"
            session_ttl_secs = 3600

            [llm]
            model = "gemini-2.5-pro"
            request_timeout_secs = 30
            analysis_timeout_secs = 90
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.session_ttl_secs, 3600);
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.request_timeout_secs, 30);
        assert_eq!(config.llm.analysis_timeout_secs, 90);
        // Unset fields keep their defaults
        assert_eq!(config.llm.max_attempts, 2);
        assert_eq!(config.min_text_chars, 50);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
            database_path = "docket.db"
            blob_root = "data"
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.analysis_timeout_secs, 120);
    }
}
