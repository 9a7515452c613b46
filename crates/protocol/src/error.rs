//! Protocol error types

use std::io;
use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while framing or decoding messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection closed partway through a length prefix
    #[error("short read: connection closed after {got} of 4 length-prefix bytes")]
    ShortRead {
        /// Prefix bytes received before EOF
        got: usize,
    },

    /// Connection closed partway through a frame payload
    #[error("incomplete frame: got {got} of {expected} payload bytes")]
    IncompleteFrame {
        /// Declared payload length
        expected: usize,
        /// Payload bytes received before EOF
        got: usize,
    },

    /// Frame payload is not the JSON we expected
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame payload is not valid UTF-8
    #[error("invalid UTF-8 payload: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
