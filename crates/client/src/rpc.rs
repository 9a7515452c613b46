//! Framed RPC client stub
//!
//! One connection, one in-flight request at a time. Every call checks the
//! response's correlation id and turns a populated `error` field into
//! [`ClientError::Rpc`]. Timeout policy belongs to the caller: wrap calls in
//! `tokio::time::timeout` and drop the client to abandon the connection.

use serde::Deserialize;
use serde_json::Value;
use tokio::net::{TcpStream, ToSocketAddrs};

use lotd_protocol::{RpcRequest, RpcResponse, read_frame, write_frame};

use crate::error::{ClientError, Result};

/// One lot as reported by `getLots`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LotInfo {
    /// Lot id
    pub id: String,
    /// Total spots
    pub capacity: u32,
    /// Sensor-reported occupancy
    pub occupied: u32,
    /// Free spots
    pub free: u32,
}

/// Client stub for the framed RPC channel
pub struct RpcClient {
    stream: TcpStream,
    next_rpc_id: u64,
}

impl RpcClient {
    /// Connect to the RPC listener
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            next_rpc_id: 1,
        })
    }

    /// Issue one call and return its result value
    pub async fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Value> {
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

    /// `getLots()` - snapshot of every lot
    pub async fn get_lots(&mut self) -> Result<Vec<LotInfo>> {
        let result = self.call("getLots", vec![]).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// `getAvailability(lotId)` - free count for one lot
    pub async fn get_availability(&mut self, lot_id: &str) -> Result<u32> {
        let result = self.call("getAvailability", vec![Value::from(lot_id)]).await?;
        result
            .as_u64()
            .map(|free| free as u32)
            .ok_or_else(|| ClientError::UnexpectedReply(result.to_string()))
    }

    /// `reserve(lotId, plate)` - `true` if a spot was reserved
    pub async fn reserve(&mut self, lot_id: &str, plate: &str) -> Result<bool> {
        let result = self
            .call("reserve", vec![Value::from(lot_id), Value::from(plate)])
            .await?;
        result
            .as_bool()
            .ok_or_else(|| ClientError::UnexpectedReply(result.to_string()))
    }

    /// `cancel(lotId, plate)` - `true` if a reservation was removed
    pub async fn cancel(&mut self, lot_id: &str, plate: &str) -> Result<bool> {
        let result = self
            .call("cancel", vec![Value::from(lot_id), Value::from(plate)])
            .await?;
        result
            .as_bool()
            .ok_or_else(|| ClientError::UnexpectedReply(result.to_string()))
    }
}
