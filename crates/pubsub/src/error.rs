//! Error types for the subscription engine

use thiserror::Error;

/// Result type for subscription operations
pub type Result<T> = std::result::Result<T, PubSubError>;

/// Errors that can occur in the subscription engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PubSubError {
    /// Subscription requested for a lot that is not configured
    #[error("Unknown lot: {0}")]
    UnknownLot(String),
}
