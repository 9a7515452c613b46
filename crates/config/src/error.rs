//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No lots configured
    #[error("no lots configured - at least one [[lots]] entry is required")]
    NoLots,

    /// Two lots share an id
    #[error("duplicate lot id '{id}'")]
    DuplicateLot {
        /// The conflicting id
        id: String,
    },

    /// A lot with zero capacity
    #[error("lot '{id}' has zero capacity")]
    ZeroCapacity {
        /// Lot id
        id: String,
    },

    /// Initial occupancy exceeding capacity
    #[error("lot '{id}' has occupied {occupied} exceeding capacity {capacity}")]
    OccupiedExceedsCapacity {
        /// Lot id
        id: String,
        /// Configured initial occupancy
        occupied: u32,
        /// Configured capacity
        capacity: u32,
    },

    /// Two listeners configured on the same port
    #[error("port {port} is used by multiple listeners: {listeners}")]
    DuplicatePort {
        /// The conflicting port
        port: u16,
        /// Listeners using this port
        listeners: String,
    },

    /// Validation error - invalid value
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create a DuplicateLot error
    pub fn duplicate_lot(id: impl Into<String>) -> Self {
        Self::DuplicateLot { id: id.into() }
    }

    /// Create a DuplicatePort error
    pub fn duplicate_port(port: u16, listeners: impl Into<String>) -> Self {
        Self::DuplicatePort {
            port,
            listeners: listeners.into(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
