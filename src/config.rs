//! Configuration loader and validator for the charge-point console.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::api::{as_base, join_below};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub console: Console,
    pub session: Session,
    pub realtime: Realtime,
}

/// Where the REST backend lives and how we introduce ourselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backend {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Console {
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub identity_path: String,
}

/// Push channel for charge-point status notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Realtime {
    pub websocket_path: String,
}

impl Config {
    /// Backend root; always ends with `/` so request paths stay below it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.backend.base_url.trim())
            .map(as_base)
            .map_err(|_| ConfigError::Invalid("backend.base_url must be an absolute URL"))
    }

    /// Websocket endpoint on the same host as the backend (`ws` for `http`,
    /// `wss` for `https`).
    pub fn websocket_url(&self) -> Result<Url, ConfigError> {
        let base = self.base_url()?;
        let scheme = match base.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        let mut url = join_below(&base, &self.realtime.websocket_path)
            .map_err(|_| ConfigError::Invalid("realtime.websocket_path is not a valid path"))?;
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::Invalid("backend.base_url cannot carry a websocket scheme"))?;
        Ok(url)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `console.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("console.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let base = cfg.base_url()?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("backend.base_url must use http or https"));
    }
    if cfg.backend.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.user_agent must be non-empty"));
    }

    if cfg.console.page_size == 0 {
        return Err(ConfigError::Invalid("console.page_size must be > 0"));
    }

    if !cfg.session.identity_path.starts_with('/') {
        return Err(ConfigError::Invalid("session.identity_path must start with '/'"));
    }
    if !cfg.realtime.websocket_path.starts_with('/') {
        return Err(ConfigError::Invalid("realtime.websocket_path must start with '/'"));
    }

    Ok(())
}

/// Example configuration, printed by `chargepoint-console example-config`.
pub fn example() -> &'static str {
    r#"backend:
  base_url: "http://localhost:8080/"
  user_agent: "chargepoint-console/0.1"

console:
  page_size: 10

session:
  identity_path: "/api/user/me"

realtime:
  websocket_path: "/websocket/chargepoint"
"#
}
