//! Listener and reservation settings
//!
//! The server exposes four independent TCP listeners: the line protocol for
//! interactive queries, the framed RPC protocol, the sensor ingest channel,
//! and the pub/sub channel.

use std::time::Duration;

use serde::Deserialize;

/// Default reservation lifetime (5 minutes)
const DEFAULT_RESERVATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// line_port = 5000
/// rpc_port = 5001
/// sensor_port = 5002
/// pubsub_port = 5003
/// reservation_timeout = "300s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for all listeners
    /// Default: "127.0.0.1"
    pub host: String,

    /// Line protocol port
    /// Default: 5000
    pub line_port: u16,

    /// Framed RPC port
    /// Default: 5001
    pub rpc_port: u16,

    /// Sensor ingest port
    /// Default: 5002
    pub sensor_port: u16,

    /// Pub/sub port
    /// Default: 5003
    pub pubsub_port: u16,

    /// How long a reservation is held before lazy expiry removes it
    /// Default: 300s
    #[serde(with = "humantime_serde")]
    pub reservation_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            line_port: 5000,
            rpc_port: 5001,
            sensor_port: 5002,
            pubsub_port: 5003,
            reservation_timeout: DEFAULT_RESERVATION_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Bind address for the line protocol listener
    pub fn line_addr(&self) -> String {
        format!("{}:{}", self.host, self.line_port)
    }

    /// Bind address for the RPC listener
    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.rpc_port)
    }

    /// Bind address for the sensor listener
    pub fn sensor_addr(&self) -> String {
        format!("{}:{}", self.host, self.sensor_port)
    }

    /// Bind address for the pub/sub listener
    pub fn pubsub_addr(&self) -> String {
        format!("{}:{}", self.host, self.pubsub_port)
    }
}
