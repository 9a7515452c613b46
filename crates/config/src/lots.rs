//! Lot definitions
//!
//! Lots are created once at startup and live for the life of the process.

use serde::Deserialize;

/// Definition of one parking lot
///
/// # Example
///
/// ```toml
/// [[lots]]
/// id = "LOT-A"
/// capacity = 50
/// occupied = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LotConfig {
    /// Unique lot identifier
    pub id: String,

    /// Total number of spots (fixed for the life of the process)
    pub capacity: u32,

    /// Sensor-reported occupancy at startup
    /// Default: 0
    #[serde(default)]
    pub occupied: u32,
}
