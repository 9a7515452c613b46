//! Line protocol command grammar
//!
//! Newline-terminated ASCII commands used by interactive query clients:
//!
//! ```text
//! PING
//! LOTS
//! AVAIL <lot>
//! RESERVE <lot> <plate>
//! CANCEL <lot> <plate>
//! ```
//!
//! The command word is case-insensitive; arity is exact. Parse failures map
//! to `ERROR: <reason>` response lines and never close the connection.

use thiserror::Error;

/// A parsed line-protocol command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check
    Ping,
    /// Snapshot every lot as a JSON array
    Lots,
    /// Free count for one lot
    Avail {
        /// Lot id
        lot_id: String,
    },
    /// Reserve a spot
    Reserve {
        /// Lot id
        lot_id: String,
        /// Plate identifier
        plate: String,
    },
    /// Cancel a reservation
    Cancel {
        /// Lot id
        lot_id: String,
        /// Plate identifier
        plate: String,
    },
}

/// Why a command line failed to parse
///
/// The `Display` text is exactly what goes after the `ERROR: ` prefix on the
/// wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing on the line
    #[error("Empty command")]
    Empty,

    /// AVAIL without its argument
    #[error("AVAIL requires lot_id")]
    AvailArity,

    /// RESERVE without both arguments
    #[error("RESERVE requires lot_id and plate")]
    ReserveArity,

    /// CANCEL without both arguments
    #[error("CANCEL requires lot_id and plate")]
    CancelArity,

    /// Command word outside the grammar
    #[error("Unknown command: {0}")]
    Unknown(String),
}

impl Command {
    /// Parse one command line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&word) = parts.first() else {
            return Err(CommandError::Empty);
        };

        let word = word.to_ascii_uppercase();
        match word.as_str() {
            "PING" => Ok(Self::Ping),
            "LOTS" => Ok(Self::Lots),
            "AVAIL" => {
                if parts.len() != 2 {
                    return Err(CommandError::AvailArity);
                }
                Ok(Self::Avail {
                    lot_id: parts[1].to_string(),
                })
            }
            "RESERVE" => {
                if parts.len() != 3 {
                    return Err(CommandError::ReserveArity);
                }
                Ok(Self::Reserve {
                    lot_id: parts[1].to_string(),
                    plate: parts[2].to_string(),
                })
            }
            "CANCEL" => {
                if parts.len() != 3 {
                    return Err(CommandError::CancelArity);
                }
                Ok(Self::Cancel {
                    lot_id: parts[1].to_string(),
                    plate: parts[2].to_string(),
                })
            }
            _ => Err(CommandError::Unknown(word.clone())),
        }
    }
}

#[cfg(test)]
#[path = "line_test.rs"]
mod tests;
