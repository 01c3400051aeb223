//! Layered configuration: built-in defaults, then an optional TOML file, then `UDP3000S__*`
//! environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "psu.toml";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PsuConfig {
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransportConfig {
    /// Read/write timeout applied to every opened session.
    pub timeout_ms: u32,
    /// Baud rate for serial (and USB virtual COM port) resources.
    pub baud_rate: u32,
    /// Resources that cannot be discovered, e.g. `TCPIP0::192.168.1.20::5025::SOCKET`.
    pub resources: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            baud_rate: 115_200,
            resources: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> Result<PsuConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&PsuConfig::default())?);

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
    }

    builder = builder.add_source(
        Environment::with_prefix("UDP3000S")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize::<PsuConfig>()
}
