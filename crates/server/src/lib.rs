//! lotd network listeners
//!
//! Four independent TCP listeners share the lot store:
//!
//! - [`LineServer`] - newline-terminated interactive queries
//! - [`RpcServer`] - framed JSON request/response
//! - [`SensorServer`] - line-delimited occupancy deltas feeding the update
//!   pipeline
//! - [`PubSubServer`] - framed subscribe/unsubscribe plus event push
//!
//! Each accepted connection runs in its own task; a connection failure never
//! crosses to another connection, and no handler holds a lot lock across a
//! network I/O boundary (store operations are synchronous and brief).

mod error;
mod line;
mod pubsub;
mod rpc;
mod sensor;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use lotd_ingest::UpdateSender;
use lotd_pubsub::SubscriptionEngine;
use lotd_store::LotStore;

pub use error::{Result, ServerError};
pub use line::{LineServer, respond};
pub use pubsub::PubSubServer;
pub use rpc::{RpcServer, dispatch};
pub use sensor::SensorServer;

/// Bind addresses for the four listeners
#[derive(Debug, Clone)]
pub struct ListenAddrs {
    /// Line protocol (e.g. "127.0.0.1:5000")
    pub line: String,
    /// Framed RPC
    pub rpc: String,
    /// Sensor ingest
    pub sensor: String,
    /// Pub/sub
    pub pubsub: String,
}

/// Spawn all four listeners
///
/// Each runs until the token is cancelled; the returned handles resolve when
/// their accept loops stop.
pub fn spawn_listeners(
    addrs: ListenAddrs,
    store: Arc<LotStore>,
    engine: Arc<SubscriptionEngine>,
    updates: UpdateSender,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<Result<()>>> {
    vec![
        tokio::spawn(LineServer::new(addrs.line, Arc::clone(&store)).run(cancel.clone())),
        tokio::spawn(RpcServer::new(addrs.rpc, store).run(cancel.clone())),
        tokio::spawn(SensorServer::new(addrs.sensor, updates).run(cancel.clone())),
        tokio::spawn(PubSubServer::new(addrs.pubsub, engine).run(cancel.clone())),
    ]
}
