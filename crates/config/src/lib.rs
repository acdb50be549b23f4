//! Configuration loading, validation, and management for Lexline.
//!
//! Loads configuration from `~/.lexline/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.lexline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Primary LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Providers tried, in order, after the primary one fails
    #[serde(default)]
    pub fallback_providers: Vec<String>,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    #[serde(default = "default_penalty")]
    pub presence_penalty: f32,

    #[serde(default = "default_penalty")]
    pub frequency_penalty: f32,

    /// Per-provider timeout inside the fallback chain
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session store configuration
    #[serde(default)]
    pub sessions: SessionsConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_penalty() -> f32 {
    0.1
}
fn default_provider_timeout_secs() -> u64 {
    60
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("fallback_providers", &self.fallback_providers)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("presence_penalty", &self.presence_penalty)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("providers", &self.providers)
            .field("gateway", &self.gateway)
            .field("sessions", &self.sessions)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model to request from this provider instead of `default_model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Requests per client per minute (0 disables the limiter)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: usize,

    /// Key the rate limiter on `X-Forwarded-For` instead of the peer address.
    /// Only enable behind a reverse proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5000".into()]
}
fn default_rate_limit() -> usize {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            rate_limit_per_minute: default_rate_limit(),
            trust_forwarded_for: false,
        }
    }
}

/// Which session store backs the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// "memory" or "sqlite"
    #[serde(default = "default_sessions_backend")]
    pub backend: String,

    /// Database path for the sqlite backend (defaults to `~/.lexline/sessions.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Capacity of the in-memory store before the stalest session is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_sessions_backend() -> String {
    "memory".into()
}
fn default_max_sessions() -> usize {
    1_000
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            backend: default_sessions_backend(),
            path: None,
            max_sessions: default_max_sessions(),
        }
    }
}

impl SessionsConfig {
    /// The sqlite database path, falling back to the config directory.
    pub fn sqlite_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions.db"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.lexline/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `LEXLINE_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("LEXLINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("LEXLINE_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("LEXLINE_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lexline")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        if !matches!(self.sessions.backend.as_str(), "memory" | "sqlite") {
            return Err(ConfigError::ValidationError(format!(
                "unknown sessions.backend '{}' (expected \"memory\" or \"sqlite\")",
                self.sessions.backend
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            fallback_providers: vec![],
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            presence_penalty: default_penalty(),
            frequency_penalty: default_penalty(),
            provider_timeout_secs: default_provider_timeout_secs(),
            providers: HashMap::new(),
            gateway: GatewayConfig::default(),
            sessions: SessionsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.default_max_tokens, 1500);
        assert_eq!(config.gateway.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.sessions.backend, "memory");
    }

    #[test]
    fn forwarded_for_is_untrusted_unless_enabled() {
        assert!(!GatewayConfig::default().trust_forwarded_for);

        let parsed: GatewayConfig = toml::from_str("trust_forwarded_for = true").unwrap();
        assert!(parsed.trust_forwarded_for);
        assert_eq!(parsed.port, 5000);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_session_backend_rejected() {
        let mut config = AppConfig::default();
        config.sessions.backend = "redis".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn load_from_file_with_fallback_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "openai"
fallback_providers = ["groq"]

[providers.groq]
api_key = "gsk-test"
default_model = "llama-3.1-70b-versatile"

[sessions]
backend = "sqlite"
path = "/tmp/lexline-test.db"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.fallback_providers, vec!["groq".to_string()]);
        assert_eq!(
            config.providers["groq"].default_model.as_deref(),
            Some("llama-3.1-70b-versatile")
        );
        assert_eq!(
            config.sessions.sqlite_path(),
            PathBuf::from("/tmp/lexline-test.db")
        );
        assert!(config.has_api_key());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_temperature = \"hot\"").unwrap();

        match AppConfig::load_from(&path) {
            Err(ConfigError::ParseError { .. }) => {}
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_api_keys() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("5000"));
    }
}
