//! Server configuration
//!
//! Defaults, optionally overlaid by a YAML file named in `WEBSERVER_CONFIG`,
//! then by the `WEBSERVER_HOST` and `WEBSERVER_PORT` environment variables.
//! Bare `HOST` and `PORT` are not read.

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "WEBSERVER_CONFIG";
pub const HOST_VAR: &str = "WEBSERVER_HOST";
pub const PORT_VAR: &str = "WEBSERVER_PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind; all interfaces by default
    pub host: String,
    pub port: u16,
    /// Cap on concurrently served connections. Unset means one task per
    /// connection with no limit.
    pub max_connections: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_connections: None,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to read environment variables.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = match lookup(CONFIG_PATH_VAR) {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                Self::from_yaml_str(&raw)
                    .with_context(|| format!("Invalid config file {}", path))?
            }
            None => Self::default(),
        };

        if let Some(host) = lookup(HOST_VAR) {
            cfg.server.host = host;
        }

        if let Some(port) = lookup(PORT_VAR) {
            cfg.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {:?}", PORT_VAR, port))?;
        }

        if cfg.server.max_connections == Some(0) {
            anyhow::bail!("server.max_connections must be at least 1");
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse YAML config")
    }
}
