//! lotd configuration
//!
//! TOML-based configuration loading with sensible defaults. Every section is
//! optional except the lot list - a server with no lots has nothing to serve.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use lotd_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[[lots]]\nid = \"LOT-A\"\ncapacity = 10").unwrap();
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [[lots]]
//! id = "LOT-A"
//! capacity = 50
//! ```
//!
//! See `configs/example.toml` for all available options.

mod error;
mod ingest;
mod logging;
mod lots;
mod pubsub;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use ingest::IngestConfig;
pub use logging::{LogConfig, LogLevel};
pub use lots::LotConfig;
pub use pubsub::{BackPressurePolicy, PubSubConfig};
pub use server::ServerConfig;

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener addresses and reservation lifetime
    pub server: ServerConfig,

    /// Sensor update pipeline
    pub ingest: IngestConfig,

    /// Pub/sub delivery
    pub pubsub: PubSubConfig,

    /// Logging
    pub log: LogConfig,

    /// The lots served by this process, in configuration order
    pub lots: Vec<LotConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        contents.parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
