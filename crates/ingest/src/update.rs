//! Sensor update commands
//!
//! Sensors speak a one-line dialect: `UPDATE <lot> <delta>`, where `delta`
//! is a signed integer. Parsing happens at ingress so the work queue carries
//! typed items, but the sensor channel acknowledges everything either way.

/// One parsed occupancy delta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorUpdate {
    /// Target lot id
    pub lot_id: String,
    /// Signed occupancy change
    pub delta: i64,
}

impl SensorUpdate {
    /// Parse an `UPDATE <lot> <delta>` line; command word is
    /// case-insensitive, arity is exact
    pub fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 || !parts[0].eq_ignore_ascii_case("UPDATE") {
            return None;
        }
        Some(Self {
            lot_id: parts[1].to_string(),
            delta: parts[2].parse().ok()?,
        })
    }
}

#[cfg(test)]
#[path = "update_test.rs"]
mod tests;
