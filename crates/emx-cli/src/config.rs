/*
[INPUT]:  YAML configuration file, EMX_API_KEY / EMX_API_SECRET environment
[OUTPUT]: Parsed CLI configuration and the clients built from it
[POS]:    Configuration layer - connection and credential setup
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use emx_adapter::{ApiCredentials, ClientConfig, EmxClient, EmxWebSocket, Environment};
use serde::Deserialize;

pub const ENV_API_KEY: &str = "EMX_API_KEY";
pub const ENV_API_SECRET: &str = "EMX_API_SECRET";

/// Connection settings for the EMX CLI
#[derive(Clone, Deserialize)]
pub struct CliConfig {
    /// Deployment whose default endpoints are used
    #[serde(default)]
    pub environment: Environment,
    /// Overrides the environment's REST endpoint
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Overrides the environment's WebSocket endpoint
    #[serde(default)]
    pub ws_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base64 secret as issued by EMX
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long `stream` waits for the next message before stopping
    #[serde(default = "default_ws_receive_timeout_secs")]
    pub ws_receive_timeout_secs: u64,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("environment", &self.environment)
            .field("rest_url", &self.rest_url)
            .field("ws_url", &self.ws_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("ws_receive_timeout_secs", &self.ws_receive_timeout_secs)
            .finish()
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            rest_url: None,
            ws_url: None,
            api_key: None,
            api_secret: None,
            timeout_secs: default_timeout_secs(),
            ws_receive_timeout_secs: default_ws_receive_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ws_receive_timeout_secs() -> u64 {
    3
}

impl CliConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        Self::from_yaml_str(&content).with_context(|| format!("parse config file {path}"))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// File (if given) plus process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let path_str = path.to_str().context("config path must be valid utf-8")?;
                Self::from_file(path_str)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Non-empty `EMX_API_KEY` / `EMX_API_SECRET` values replace the file's
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(secret) = non_empty(ENV_API_SECRET) {
            self.api_secret = Some(secret);
        }
    }

    /// Credentials when both halves are configured
    pub fn credentials(&self) -> Result<Option<ApiCredentials>> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => {
                let credentials = ApiCredentials::new(key.clone(), secret)
                    .context("invalid api_secret")?;
                Ok(Some(credentials))
            }
            (None, None) => Ok(None),
            _ => bail!("api_key and api_secret must be configured together"),
        }
    }

    pub fn rest_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .unwrap_or_else(|| self.environment.rest_url())
    }

    pub fn ws_url(&self) -> &str {
        self.ws_url
            .as_deref()
            .unwrap_or_else(|| self.environment.ws_url())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ClientConfig::default()
        }
    }

    pub fn rest_client(&self) -> Result<EmxClient> {
        let client = EmxClient::with_config_and_base_url(self.client_config(), self.rest_url())
            .context("build REST client")?;
        Ok(match self.credentials()? {
            Some(credentials) => client.with_credentials(credentials),
            None => client,
        })
    }

    pub fn websocket(&self) -> Result<EmxWebSocket> {
        let ws = match self.credentials()? {
            Some(credentials) => EmxWebSocket::with_credentials(credentials),
            None => EmxWebSocket::new(),
        };
        Ok(ws.with_receive_timeout(Duration::from_secs(self.ws_receive_timeout_secs)))
    }
}
