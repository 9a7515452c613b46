//! lotd client stubs
//!
//! Thin async wrappers over the wire protocols in `lotd-protocol`:
//!
//! - [`RpcClient`] - framed request/response queries and reservations
//! - [`SubscriberClient`] - subscribe and receive pushed events
//! - [`SensorClient`] - line-based occupancy deltas with `ACK` handshake
//!
//! The server never cancels in-flight work; callers own timeout policy
//! (wrap any call in `tokio::time::timeout` and drop the client to abandon
//! the connection).

mod error;
mod pubsub;
mod rpc;
mod sensor;

pub use error::{ClientError, Result};
pub use pubsub::SubscriberClient;
pub use rpc::{LotInfo, RpcClient};
pub use sensor::SensorClient;
