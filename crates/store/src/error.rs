//! Error types for the lot store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the lot store
///
/// Full lots and duplicate reservations are ordinary outcomes, not errors;
/// the only store-level failure is naming a lot that was never configured.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced lot id is not configured
    #[error("Unknown lot: {0}")]
    UnknownLot(String),
}
