//! Client error types

use std::io;

use thiserror::Error;

use lotd_protocol::ProtocolError;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur in the client stubs
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error on the connection
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Framing or payload fault
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server populated the response's error field
    #[error("server error: {0}")]
    Rpc(String),

    /// Response correlation id did not match the request
    #[error("rpc id mismatch: expected {expected}, got {got}")]
    RpcIdMismatch {
        /// The id we sent
        expected: u64,
        /// The id that came back
        got: u64,
    },

    /// The server closed the connection mid-exchange
    #[error("connection closed by server")]
    ConnectionClosed,

    /// The reply did not have the shape we asked for
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// A result value failed to deserialize
    #[error("invalid result payload: {0}")]
    Decode(#[from] serde_json::Error),
}
