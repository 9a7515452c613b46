//! Pub/sub listener
//!
//! Speaks the framed RPC envelope, but accepts only `subscribe` and
//! `unsubscribe`. After a successful subscribe the connection switches to
//! event-only mode: the handler becomes that subscriber's dedicated delivery
//! loop, draining its queue onto the socket as `EVENT <lot> <free> <ts>`
//! frames. A write failure removes the subscription and tears down only
//! this connection.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lotd_protocol::{Method, RpcRequest, RpcResponse, read_frame, write_frame};
use lotd_pubsub::{Subscription, SubscriptionEngine};

use crate::error::{Result, ServerError};
use crate::rpc::str_arg;

/// The pub/sub listener
pub struct PubSubServer {
    addr: String,
    engine: Arc<SubscriptionEngine>,
}

impl PubSubServer {
    /// Create a listener for `addr`
    pub fn new(addr: impl Into<String>, engine: Arc<SubscriptionEngine>) -> Self {
        Self {
            addr: addr.into(),
            engine,
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

        info!(address = %self.addr, "pub/sub listening");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let engine = Arc::clone(&self.engine);
                        tokio::spawn(async move {
                            debug!(peer = %peer, "pub/sub client connected");
                            if let Err(e) = handle_connection(stream, engine).await
                                && !e.is_disconnect()
                            {
                                debug!(peer = %peer, error = %e, "pub/sub connection error");
                            }
                            debug!(peer = %peer, "pub/sub client disconnected");
                        });
                    }
                    Err(e) => warn!(error = %e, "accept error"),
                }
            }
        }

        info!("pub/sub stopped");
        Ok(())
    }
}

/// What a pub/sub request turned into
enum Handled {
    /// Plain response; the request loop continues
    Response(RpcResponse),
    /// A registration; the connection switches to event-only mode
    Subscribed(Arc<Subscription>),
}

async fn handle_connection(mut stream: TcpStream, engine: Arc<SubscriptionEngine>) -> Result<()> {
    loop {
        let Some(payload) = read_frame(&mut stream).await? else {
            return Ok(());
        };
        let request = RpcRequest::decode(&payload)?;

        match handle_request(&engine, &request) {
            Handled::Response(response) => {
                write_frame(&mut stream, &response.encode()?).await?;
            }
            Handled::Subscribed(subscription) => {
                let response = RpcResponse::ok(request.rpc_id, subscription.id());
                write_frame(&mut stream, &response.encode()?).await?;
                return deliver(stream, engine, subscription).await;
            }
        }
    }
}

fn handle_request(engine: &SubscriptionEngine, request: &RpcRequest) -> Handled {
    let rpc_id = request.rpc_id;

    match Method::parse(&request.method) {
        Some(Method::Subscribe) => {
            let Some(lot_id) = str_arg(request, 0) else {
                return Handled::Response(RpcResponse::err(rpc_id, "Missing lot_id argument"));
            };
            match engine.subscribe(lot_id) {
                Ok(subscription) => Handled::Subscribed(subscription),
                Err(e) => Handled::Response(RpcResponse::err(rpc_id, e.to_string())),
            }
        }

        Some(Method::Unsubscribe) => {
            let Some(id) = request.args.first().and_then(Value::as_u64) else {
                return Handled::Response(RpcResponse::err(rpc_id, "Missing sub_id argument"));
            };
            Handled::Response(RpcResponse::ok(rpc_id, engine.unsubscribe(id)))
        }

        _ => Handled::Response(RpcResponse::err(
            rpc_id,
            format!("Unknown method: {}", request.method),
        )),
    }
}

/// Event-only mode: drain the subscription queue onto the connection
///
/// Ends when the subscription is closed elsewhere (unsubscribe), when the
/// peer disconnects, or when the peer sends anything further - a subscribed
/// connection has no business talking. Every exit path but unsubscribe also
/// removes the registration.
async fn deliver(
    stream: TcpStream,
    engine: Arc<SubscriptionEngine>,
    subscription: Arc<Subscription>,
) -> Result<()> {
    let (mut read_half, mut write_half) = stream.into_split();
    let mut drain = [0u8; 64];

    loop {
        tokio::select! {
            event = subscription.next_event() => {
                // None: closed by unsubscribe, nothing left to clean up
                let Some(event) = event else { return Ok(()) };

                if let Err(e) = write_frame(&mut write_half, event.to_wire().as_bytes()).await {
                    warn!(
                        subscription_id = subscription.id(),
                        lot_id = %subscription.lot_id(),
                        error = %e,
                        "event delivery failed, removing subscriber"
                    );
                    engine.unsubscribe(subscription.id());
                    return Err(e.into());
                }
                debug!(
                    subscription_id = subscription.id(),
                    lot_id = %event.lot_id,
                    free = event.free,
                    "event delivered"
                );
            }
            received = read_half.read(&mut drain) => {
                engine.unsubscribe(subscription.id());
                return match received {
                    // Peer closed the connection
                    Ok(0) => Ok(()),
                    // Stray traffic on an event-only connection
                    Ok(_) => {
                        debug!(
                            subscription_id = subscription.id(),
                            "unexpected data on subscribed connection, disconnecting"
                        );
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                };
            }
        }
    }
}

#[cfg(test)]
#[path = "pubsub_test.rs"]
mod tests;
