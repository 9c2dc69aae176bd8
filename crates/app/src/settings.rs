//! Application settings.
//!
//! Read from `config/spendwise.toml` when present, then overridden by
//! `SPENDWISE_*` environment variables (e.g. `SPENDWISE_SERVER__PORT=8080`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_PATH: &str = "config/spendwise";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    /// Currency code used for groups created without one.
    pub currency: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            currency: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_PATH).required(false))
            .add_source(Environment::with_prefix("SPENDWISE").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
