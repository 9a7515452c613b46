//! RPC message envelope
//!
//! The RPC and pub/sub channels exchange JSON documents inside the framing
//! from [`crate::frame`]:
//!
//! - Request: `{"rpcId": 1, "method": "reserve", "args": ["LOT-A", "CAR-1"]}`
//! - Response: `{"rpcId": 1, "result": true, "error": null}`
//!
//! Exactly one of `result`/`error` is meaningful per response, both keys are
//! always present, and `rpcId` echoes the request so callers can check
//! correlation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The closed set of RPC method names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Snapshot every lot
    GetLots,
    /// Free count for one lot
    GetAvailability,
    /// Reserve a spot for a plate
    Reserve,
    /// Cancel a plate's reservation
    Cancel,
    /// Register for a lot's free-count events (pub/sub channel only)
    Subscribe,
    /// Remove a subscription (pub/sub channel only)
    Unsubscribe,
}

impl Method {
    /// Resolve a wire method name; `None` for anything outside the closed set
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "getLots" => Some(Self::GetLots),
            "getAvailability" => Some(Self::GetAvailability),
            "reserve" => Some(Self::Reserve),
            "cancel" => Some(Self::Cancel),
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            _ => None,
        }
    }

    /// The wire name of this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetLots => "getLots",
            Self::GetAvailability => "getAvailability",
            Self::Reserve => "reserve",
            Self::Cancel => "cancel",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

/// One framed RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    /// Caller-chosen correlation id, echoed in the response
    pub rpc_id: u64,
    /// Method name (see [`Method`])
    pub method: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RpcRequest {
    /// Create a request
    pub fn new(rpc_id: u64, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            rpc_id,
            method: method.into(),
            args,
        }
    }

    /// Serialize to a frame payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from a frame payload
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// One framed RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponse {
    /// Correlation id from the request
    pub rpc_id: u64,
    /// Result value; `null` when `error` is set
    #[serde(default)]
    pub result: Value,
    /// Error message; `null` on success
    #[serde(default)]
    pub error: Option<String>,
}

impl RpcResponse {
    /// Successful response
    pub fn ok(rpc_id: u64, result: impl Into<Value>) -> Self {
        Self {
            rpc_id,
            result: result.into(),
            error: None,
        }
    }

    /// Failed response; `result` is `null`
    pub fn err(rpc_id: u64, message: impl Into<String>) -> Self {
        Self {
            rpc_id,
            result: Value::Null,
            error: Some(message.into()),
        }
    }

    /// Whether the error field is populated
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serialize to a frame payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from a frame payload
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
