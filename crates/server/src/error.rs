//! Server error types

use std::io;

use thiserror::Error;

use lotd_protocol::ProtocolError;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur in the listeners
///
/// Connection-scoped failures never cross connections: a handler that fails
/// tears down its own connection and nothing else.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to an address
    #[error("failed to bind to {address}: {source}")]
    Bind {
        /// The address that could not be bound
        address: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// I/O error on a connection
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Framing or payload fault on a connection
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The update queue has shut down
    #[error("update queue closed")]
    UpdateQueueClosed,
}

impl ServerError {
    /// Whether this is an ordinary peer disconnect, not worth an error log
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
            ),
            Self::Protocol(ProtocolError::Io(e)) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
