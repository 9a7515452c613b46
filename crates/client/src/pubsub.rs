//! Pub/sub subscriber client
//!
//! Subscribe, then read pushed `EVENT` frames off the same connection. The
//! server treats a subscribed connection as event-only, so this client
//! refuses further requests once subscribed.

use serde_json::Value;
use tokio::net::{TcpStream, ToSocketAddrs};

use lotd_protocol::{Event, RpcRequest, RpcResponse, read_frame, write_frame};

use crate::error::{ClientError, Result};

/// Client stub for the pub/sub channel
pub struct SubscriberClient {
    stream: TcpStream,
    next_rpc_id: u64,
    subscribed: bool,
}

impl SubscriberClient {
    /// Connect to the pub/sub listener
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            next_rpc_id: 1,
            subscribed: false,
        })
    }

    async fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value> {
        if self.subscribed {
            return Err(ClientError::UnexpectedReply(
                "connection is in event-only mode".into(),
            ));
        }

        let rpc_id = self.next_rpc_id;
        self.next_rpc_id += 1;

        let request = RpcRequest::new(rpc_id, method, args);
        write_frame(&mut self.stream, &request.encode()?).await?;

        let Some(payload) = read_frame(&mut self.stream).await? else {
            return Err(ClientError::ConnectionClosed);
        };
        let response = RpcResponse::decode(&payload)?;

        if response.rpc_id != rpc_id {
            return Err(ClientError::RpcIdMismatch {
                expected: rpc_id,
                got: response.rpc_id,
            });
        }
        if let Some(error) = response.error {
            return Err(ClientError::Rpc(error));
        }

        Ok(response.result)
    }

    /// `subscribe(lotId)` - returns the subscription id and switches this
    /// connection to event-only mode
    pub async fn subscribe(&mut self, lot_id: &str) -> Result<u64> {
        let result = self.call("subscribe", vec![Value::from(lot_id)]).await?;
        let id = result
            .as_u64()
            .ok_or_else(|| ClientError::UnexpectedReply(result.to_string()))?;
        self.subscribed = true;
        Ok(id)
    }

    /// `unsubscribe(subId)` - only valid before subscribing on this
    /// connection; `true` if the id existed
    pub async fn unsubscribe(&mut self, subscription_id: u64) -> Result<bool> {
        let result = self
            .call("unsubscribe", vec![Value::from(subscription_id)])
            .await?;
        result
            .as_bool()
            .ok_or_else(|| ClientError::UnexpectedReply(result.to_string()))
    }

    /// Await the next pushed event
    pub async fn next_event(&mut self) -> Result<Event> {
        let Some(payload) = read_frame(&mut self.stream).await? else {
            return Err(ClientError::ConnectionClosed);
        };
        let text = std::str::from_utf8(&payload).map_err(lotd_protocol::ProtocolError::from)?;
        Event::from_wire(text).ok_or_else(|| ClientError::UnexpectedReply(text.to_string()))
    }
}
