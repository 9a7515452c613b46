//! Free-count change events
//!
//! Events ride the same length-prefixed framing as RPC traffic but carry a
//! plain-text payload:
//!
//! ```text
//! EVENT <lotId> <free> <timestamp>
//! ```
//!
//! The timestamp is RFC 3339 in UTC and contains no spaces, so the payload
//! splits cleanly on whitespace.

use chrono::{DateTime, SecondsFormat, Utc};

/// A free-count change for one lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The lot whose free count changed
    pub lot_id: String,
    /// The new free count
    pub free: u32,
    /// When the change was published
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create an event stamped with the current time
    pub fn new(lot_id: impl Into<String>, free: u32) -> Self {
        Self {
            lot_id: lot_id.into(),
            free,
            timestamp: Utc::now(),
        }
    }

    /// Render the frame payload
    pub fn to_wire(&self) -> String {
        format!(
            "EVENT {} {} {}",
            self.lot_id,
            self.free,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }

    /// Parse a frame payload; `None` for anything that is not an event
    pub fn from_wire(payload: &str) -> Option<Self> {
        let mut parts = payload.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("EVENT"), Some(lot_id), Some(free), Some(timestamp)) if parts.next().is_none() => {
                Some(Self {
                    lot_id: lot_id.to_string(),
                    free: free.parse().ok()?,
                    timestamp: timestamp.parse().ok()?,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
