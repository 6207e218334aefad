//! JSON-RPC 2.0 envelopes.
//!
//! [`decode`] is the single place a wire error envelope becomes an
//! [`RpcError`]; every transport path goes through it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorCause, RpcError};

/// Ids at or below this value are left to other JSON-RPC clients sharing the node.
pub const REQUEST_ID_START: u64 = 52;

/// Strictly increasing request id sequence, one per provider.
#[derive(Debug)]
pub struct RequestIds(AtomicU64);

impl RequestIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(REQUEST_ID_START))
    }

    /// Next id; the first call returns `REQUEST_ID_START + 1`.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Outgoing request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: String,
    /// Positional array or named-field object, depending on the method.
    pub params: Value,
    pub id: u64,
    pub jsonrpc: &'static str,
}

/// Build a request envelope.
pub fn encode(method: impl Into<String>, params: Value, id: u64) -> RpcRequest {
    RpcRequest {
        method: method.into(),
        params,
        id,
        jsonrpc: "2.0",
    }
}

/// Incoming response envelope.
///
/// The node populates exactly one of `result` and `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<WireError>,
}

/// The `error` object of a response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub cause: Option<ErrorCause>,
}

impl From<WireError> for RpcError {
    fn from(error: WireError) -> Self {
        RpcError {
            message: error.message,
            error_type: error.name,
            code: error.code,
            data: error.data,
            cause: error.cause,
        }
    }
}

/// The result of a response, or its error envelope as an [`RpcError`].
pub fn decode(response: RpcResponse) -> Result<Value, Error> {
    match response.error {
        Some(error) => Err(Error::Rpc(error.into())),
        None => Ok(response.result),
    }
}

/// Parse a response body and [`decode`] it.
pub fn decode_body(body: &str) -> Result<Value, Error> {
    decode(serde_json::from_str(body)?)
}
