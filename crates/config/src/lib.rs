//! Configuration loading, validation, and management for Eva.
//!
//! Loads configuration from `~/.eva/config.toml` with environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.eva/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion API key for the active provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Active completion provider ("anthropic" or "openai")
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model requested from the provider
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum-output-token ceiling per completion call
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Memory directory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Composio action-execution settings
    #[serde(default)]
    pub actions: ActionsConfig,

    /// Alert/brief delivery targets
    #[serde(default)]
    pub user: UserConfig,
}

fn default_provider() -> String {
    "anthropic".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4096
}

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
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("memory", &self.memory)
            .field("gateway", &self.gateway)
            .field("actions", &self.actions)
            .field("user", &self.user)
            .finish()
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Iteration ceiling for the tool-call loop. Exceeding it fails the
    /// invocation instead of looping against a misbehaving model.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
}

fn default_max_tool_iterations() -> u32 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

/// Memory directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Repository root holding the memory directory (used for git sync)
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,

    /// Directory containing the five memory documents
    #[serde(default = "default_memory_dir")]
    pub dir: PathBuf,
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from("/opt/eva")
}
fn default_memory_dir() -> PathBuf {
    default_repo_dir().join("memory")
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            repo_dir: default_repo_dir(),
            dir: default_memory_dir(),
        }
    }
}

/// Gateway settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Meta webhook verification token (GET /webhook handshake)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_token: Option<String>,

    /// Meta app secret for HMAC signature verification. None = no check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
}

fn default_port() -> u16 {
    18790
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            verify_token: None,
            app_secret: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("verify_token", &redact(&self.verify_token))
            .field("app_secret", &redact(&self.app_secret))
            .finish()
    }
}

/// Composio action-execution settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composio_api_key: Option<String>,

    #[serde(default = "default_composio_url")]
    pub composio_base_url: String,
}

fn default_composio_url() -> String {
    "https://backend.composio.dev/api/v2".into()
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            composio_api_key: None,
            composio_base_url: default_composio_url(),
        }
    }
}

impl std::fmt::Debug for ActionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsConfig")
            .field("composio_api_key", &redact(&self.composio_api_key))
            .field("composio_base_url", &self.composio_base_url)
            .finish()
    }
}

/// Where workflow alerts and briefs are delivered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Email address for heartbeat alerts and the weekly review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// WhatsApp number for the morning brief
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.eva/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `EVA_API_KEY`, `ANTHROPIC_API_KEY`, `OPENAI_API_KEY` (API key)
    /// - `EVA_PROVIDER`, `EVA_MODEL`, `EVA_MEMORY_DIR`
    /// - `COMPOSIO_API_KEY`, `META_VERIFY_TOKEN`, `META_APP_SECRET`
    /// - `USER_EMAIL`, `USER_WHATSAPP`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("EVA_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("EVA_PROVIDER") {
            config.default_provider = provider;
        }
        if let Ok(model) = std::env::var("EVA_MODEL") {
            config.default_model = model;
        }
        if let Ok(dir) = std::env::var("EVA_MEMORY_DIR") {
            config.memory.dir = PathBuf::from(dir);
        }
        if let Ok(repo) = std::env::var("EVA_REPO_DIR") {
            config.memory.repo_dir = PathBuf::from(&repo);
        }

        if config.actions.composio_api_key.is_none() {
            config.actions.composio_api_key = std::env::var("COMPOSIO_API_KEY").ok();
        }
        if config.gateway.verify_token.is_none() {
            config.gateway.verify_token = std::env::var("META_VERIFY_TOKEN").ok();
        }
        if config.gateway.app_secret.is_none() {
            config.gateway.app_secret = std::env::var("META_APP_SECRET").ok();
        }
        if config.user.email.is_none() {
            config.user.email = std::env::var("USER_EMAIL").ok();
        }
        if config.user.whatsapp.is_none() {
            config.user.whatsapp = std::env::var("USER_WHATSAPP").ok();
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
        dirs_home().join(".eva")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.default_provider.as_str() {
            "anthropic" | "openai" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "default_provider must be \"anthropic\" or \"openai\", got \"{other}\""
                )));
            }
        }

        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        if self.agent.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_iterations must be > 0".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
            gateway: GatewayConfig::default(),
            actions: ActionsConfig::default(),
            user: UserConfig::default(),
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
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.gateway.port, 18790);
        assert_eq!(config.agent.max_tool_iterations, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.memory.dir, config.memory.dir);
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = AppConfig {
            default_provider: "skynet".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_loop_budget_rejected() {
        let config = AppConfig {
            agent: AgentConfig {
                max_tool_iterations: 0,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_provider, "anthropic");
    }

    #[test]
    fn parses_full_config_file() {
        let toml_str = r#"
api_key = "sk-ant-test"
default_provider = "openai"
default_model = "gpt-4o"

[agent]
max_tool_iterations = 5

[memory]
repo_dir = "/srv/eva"
dir = "/srv/eva/memory"

[gateway]
port = 9000
verify_token = "hunter2"

[user]
email = "louis@example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.agent.max_tool_iterations, 5);
        assert_eq!(config.memory.dir, PathBuf::from("/srv/eva/memory"));
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.user.email.as_deref(), Some("louis@example.com"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-ant-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
