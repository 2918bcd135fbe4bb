use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4096";
pub const DEFAULT_USERNAME: &str = "opencode";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_PORT: u16 = 18790;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_COMMAND: &str = "oc";
pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const DEFAULT_COMMAND_LIST_LIMIT: usize = 20;

/// Top-level config (ocrelay.toml + OCRELAY_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub opencode: OpenCodeConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Connection settings for the upstream OpenCode Server.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenCodeConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    /// Empty password disables the Basic Auth header entirely.
    #[serde(default)]
    pub password: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl OpenCodeConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Basic Auth credentials, or `None` when no password is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.password.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }
}

impl Default for OpenCodeConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            username: default_username(),
            password: String::new(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for OpenCodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCodeConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP surface that chat hosts post inbound messages to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required on `POST /v1/messages`. `None` leaves it open.
    pub token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_PORT,
            token: None,
        }
    }
}

/// Chat-side behaviour of the `/oc` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Command word without the leading slash.
    #[serde(default = "default_command")]
    pub command: String,
    /// Maximum sessions shown by `sessions`.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    /// Maximum entries shown by `commands`.
    #[serde(default = "default_command_list_limit")]
    pub command_list_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            list_limit: DEFAULT_LIST_LIMIT,
            command_list_limit: DEFAULT_COMMAND_LIST_LIMIT,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}
fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_command() -> String {
    DEFAULT_COMMAND.to_string()
}
fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}
fn default_command_list_limit() -> usize {
    DEFAULT_COMMAND_LIST_LIMIT
}

impl RelayConfig {
    /// Load config from a TOML file with OCRELAY_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.ocrelay/ocrelay.toml
    ///
    /// A missing file is not an error; every field has a default.
    /// Env keys use `__` between section and field, e.g.
    /// `OCRELAY_OPENCODE__SERVER_URL`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        tracing::debug!(path = %path, "loading relay config");

        Self::extract(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("OCRELAY_").split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: RelayConfig = figment
            .extract()
            .map_err(|e| RelayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a working relay.
    ///
    /// URL syntax is checked when the HTTP client is built.
    pub fn validate(&self) -> Result<()> {
        if self.opencode.server_url.trim().is_empty() {
            return Err(RelayError::InvalidSetting {
                field: "opencode.server_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.opencode.timeout == 0 {
            return Err(RelayError::InvalidSetting {
                field: "opencode.timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }
        let command = self.chat.command.trim();
        if command.is_empty() || command.contains(char::is_whitespace) {
            return Err(RelayError::InvalidSetting {
                field: "chat.command",
                reason: "must be a single non-empty word".to_string(),
            });
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.ocrelay/ocrelay.toml", home)
}
