//! Server configuration.
//!
//! Layered from lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. `config/server.toml` and `config/server.local.toml` (both optional), or the
//!    file given with `--config`
//! 3. `TEGAMI_SERVER__*` environment variables (`__` separates nested keys,
//!    e.g. `TEGAMI_SERVER__HISTORY__MAX_LIMIT=50`)
//! 4. command line flags, applied by the binary

use std::{net::SocketAddr, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tegami_shared::logger::LogFormat;

use crate::usecase::{DEFAULT_MAX_UPLOAD_BYTES, HistorySettings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid bind address: {0}")]
    InvalidBindAddr(String),

    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let settings = HistorySettings::default();
        Self {
            default_limit: settings.default_limit,
            max_limit: settings.max_limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct UploadsConfig {
    pub max_bytes: usize,
    /// Base of the URLs handed out for stored objects. Derived from the
    /// listener address when unset.
    pub public_base_url: Option<String>,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
    /// JSON file with the users (and their tokens) to load at startup
    pub seed_path: Option<String>,
    /// Upper bound for every message store, user directory and object storage call
    pub gateway_timeout_ms: u64,
    pub history: HistoryConfig,
    pub uploads: UploadsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "debug".to_string(),
            log_format: LogFormat::Compact.as_str().to_string(),
            seed_path: None,
            gateway_timeout_ms: 5_000,
            history: HistoryConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

impl ServerConfig {
    const ENV_PREFIX: &'static str = "TEGAMI_SERVER";

    /// Load the configuration. `config_file` replaces the default file lookup.
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let mut builder = config::Config::builder()
            .set_default("host", defaults.host.clone())?
            .set_default("port", defaults.port as i64)?
            .set_default("log_level", defaults.log_level.clone())?
            .set_default("log_format", defaults.log_format.clone())?
            .set_default("gateway_timeout_ms", defaults.gateway_timeout_ms as i64)?;

        builder = match config_file {
            Some(path) => builder.add_source(config::File::with_name(path).required(true)),
            None => builder
                .add_source(config::File::with_name("config/server").required(false))
                .add_source(config::File::with_name("config/server.local").required(false)),
        };

        let settings: ServerConfig = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn listener_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidBindAddr(addr))
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str(&self.log_format).unwrap_or_default()
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }

    pub fn history_settings(&self) -> HistorySettings {
        HistorySettings {
            default_limit: self.history.default_limit,
            max_limit: self.history.max_limit,
        }
    }

    /// Base URL for stored objects, falling back to the address actually bound.
    pub fn public_base_url(&self, bound: SocketAddr) -> String {
        self.uploads
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{bound}"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listener_addr()?;
        LogFormat::from_str(&self.log_format).map_err(ConfigError::InvalidLogFormat)?;
        if self.gateway_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "gateway_timeout_ms must be positive".into(),
            ));
        }
        if self.history.max_limit == 0 || self.history.default_limit == 0 {
            return Err(ConfigError::Invalid("history limits must be positive".into()));
        }
        if self.history.default_limit > self.history.max_limit {
            return Err(ConfigError::Invalid(format!(
                "history.default_limit ({}) exceeds history.max_limit ({})",
                self.history.default_limit, self.history.max_limit
            )));
        }
        if self.uploads.max_bytes == 0 {
            return Err(ConfigError::Invalid("uploads.max_bytes must be positive".into()));
        }
        Ok(())
    }
}
