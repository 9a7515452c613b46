//! Framed RPC listener
//!
//! JSON request/response inside the length-prefixed framing. Per-request
//! failures - bad arity, unknown method, unknown lot - populate the
//! response's `error` field and keep the connection; a frame whose payload
//! is not valid JSON is framing-level corruption and fatal to that
//! connection only.

use std::sync::Arc;

use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lotd_protocol::{Method, RpcRequest, RpcResponse, read_frame, write_frame};
use lotd_store::{LotStore, ReserveOutcome};

use crate::error::{Result, ServerError};

/// The framed RPC listener
pub struct RpcServer {
    addr: String,
    store: Arc<LotStore>,
}

impl RpcServer {
    /// Create a listener for `addr`
    pub fn new(addr: impl Into<String>, store: Arc<LotStore>) -> Self {
        Self {
            addr: addr.into(),
            store,
        }
    }

    /// Accept connections until cancelled
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| ServerError::Bind {
                address: self.addr.clone(),
                source: e,
            })?;

        info!(address = %self.addr, "RPC listening");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let store = Arc::clone(&self.store);
                        tokio::spawn(async move {
                            debug!(peer = %peer, "RPC client connected");
                            if let Err(e) = handle_connection(stream, store).await
                                && !e.is_disconnect()
                            {
                                debug!(peer = %peer, error = %e, "RPC connection error");
                            }
                            debug!(peer = %peer, "RPC client disconnected");
                        });
                    }
                    Err(e) => warn!(error = %e, "accept error"),
                }
            }
        }

        info!("RPC stopped");
        Ok(())
    }
}

async fn handle_connection(mut stream: TcpStream, store: Arc<LotStore>) -> Result<()> {
    loop {
        let Some(payload) = read_frame(&mut stream).await? else {
            return Ok(());
        };
        let request = RpcRequest::decode(&payload)?;
        let response = dispatch(&store, &request);
        write_frame(&mut stream, &response.encode()?).await?;
    }
}

/// Map one RPC request onto the lot store
pub fn dispatch(store: &LotStore, request: &RpcRequest) -> RpcResponse {
    let rpc_id = request.rpc_id;

    let Some(method) = Method::parse(&request.method) else {
        return RpcResponse::err(rpc_id, format!("Unknown method: {}", request.method));
    };

    match method {
        Method::GetLots => match serde_json::to_value(store.list_snapshots()) {
            Ok(lots) => RpcResponse::ok(rpc_id, lots),
            Err(e) => RpcResponse::err(rpc_id, e.to_string()),
        },

        Method::GetAvailability => {
            let Some(lot_id) = str_arg(request, 0) else {
                return RpcResponse::err(rpc_id, "Missing lot_id argument");
            };
            match store.snapshot(lot_id) {
                Ok(snapshot) => RpcResponse::ok(rpc_id, snapshot.free),
                Err(e) => RpcResponse::err(rpc_id, e.to_string()),
            }
        }

        Method::Reserve => {
            let (Some(lot_id), Some(plate)) = (str_arg(request, 0), str_arg(request, 1)) else {
                return RpcResponse::err(rpc_id, "Missing arguments");
            };
            match store.reserve(lot_id, plate) {
                Ok(outcome) => RpcResponse::ok(rpc_id, outcome == ReserveOutcome::Reserved),
                Err(e) => RpcResponse::err(rpc_id, e.to_string()),
            }
        }

        Method::Cancel => {
            let (Some(lot_id), Some(plate)) = (str_arg(request, 0), str_arg(request, 1)) else {
                return RpcResponse::err(rpc_id, "Missing arguments");
            };
            match store.cancel(lot_id, plate) {
                Ok(removed) => RpcResponse::ok(rpc_id, removed),
                Err(e) => RpcResponse::err(rpc_id, e.to_string()),
            }
        }

        Method::Subscribe => RpcResponse::err(rpc_id, "Use pub/sub connection for subscribe"),
        Method::Unsubscribe => RpcResponse::err(rpc_id, "Use pub/sub connection for unsubscribe"),
    }
}

/// Positional string argument
pub(crate) fn str_arg<'a>(request: &'a RpcRequest, index: usize) -> Option<&'a str> {
    request.args.get(index).and_then(Value::as_str)
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
