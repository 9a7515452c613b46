//! lotd wire protocols
//!
//! Everything that crosses a socket lives here, shared by the server and the
//! client stubs:
//!
//! - [`frame`] - the 4-byte big-endian length-prefixed framing used by the
//!   RPC and pub/sub channels
//! - [`rpc`] - the JSON request/response envelope and the closed method set
//! - [`line`] - the newline-terminated query command grammar
//! - [`event`] - the `EVENT <lot> <free> <timestamp>` push payload

mod error;
mod event;
pub mod frame;
mod line;
mod rpc;

pub use error::{ProtocolError, Result};
pub use event::Event;
pub use frame::{LENGTH_PREFIX_SIZE, read_frame, write_frame};
pub use line::{Command, CommandError};
pub use rpc::{Method, RpcRequest, RpcResponse};
