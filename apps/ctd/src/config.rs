//! Driver configuration
//!
//! Loaded in three tiers:
//! 1. Built-in defaults
//! 2. TOML file (`--config`)
//! 3. CLI arguments
//!
//! ```toml
//! [link]
//! address = "192.168.1.40:4001"
//! max_retry_delay_ms = 5000
//! max_attempts = 0
//!
//! [control]
//! stdin = true
//!
//! [logging]
//! filter = "info"
//! ```

use ctd_actors::constants::link;
use ctd_actors::LinkConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::cli::Args;

/// Filter used when `--verbose` is given
pub const VERBOSE_FILTER: &str = "debug";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::ParseError(e.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// `[link]`: where the serial bridge is and how hard to retry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSection {
    pub address: String,
    pub max_retry_delay_ms: u64,
    /// 0 retries forever
    pub max_attempts: u32,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            address: link::DEFAULT_ADDRESS.to_string(),
            max_retry_delay_ms: link::MAX_RETRY_DELAY_MS,
            max_attempts: link::MAX_CONNECT_ATTEMPTS,
        }
    }
}

/// `[control]`: operator input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlSection {
    /// Read `start`/`stop` commands from stdin
    pub stdin: bool,
}

impl Default for ControlSection {
    fn default() -> Self {
        Self { stdin: true }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// tracing filter directive, e.g. `info` or `ctd_actors=debug,info`
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub link: LinkSection,
    pub control: ControlSection,
    pub logging: LoggingSection,
}

impl DriverConfig {
    /// Load from a TOML file. Missing sections and keys take their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then `--config`, then the remaining CLI flags.
    pub fn resolve(args: &Args) -> ConfigResult<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(address) = &args.link {
            self.link.address = address.clone();
        }
        if args.no_stdin {
            self.control.stdin = false;
        }
        if args.verbose {
            self.logging.filter = VERBOSE_FILTER.to_string();
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let address = self.link.address.trim();
        match address.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "link.address '{}' must be host:port",
                    self.link.address
                )))
            }
        }

        if self.link.max_retry_delay_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "link.max_retry_delay_ms must be greater than 0".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            address: self.link.address.trim().to_string(),
            max_retry_delay_ms: self.link.max_retry_delay_ms,
            max_attempts: self.link.max_attempts,
        }
    }
}
