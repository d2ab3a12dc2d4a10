//! JSON-RPC payload types.
//!
//! These model the `{jsonrpc, id, method, params}` shape produced by web3
//! client libraries. The response envelope keeps unknown fields so that a
//! passthrough response can be surfaced to the caller without modification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC request as submitted by a web3 client library.
///
/// The `id` is a caller-supplied correlation id; it is only ever echoed back
/// in the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The JSON-RPC protocol version, `"2.0"` in practice.
    pub jsonrpc: String,

    /// Caller-supplied correlation id, echoed back in the response.
    pub id: u64,

    /// The RPC method name. This is the sole discriminant used for request
    /// classification; matching is exact and case-sensitive.
    pub method: String,

    /// The positional parameters of the call.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    /// Convenience constructor with the protocol version pinned to `"2.0"`.
    pub fn new(id: u64, method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_owned(),
            id,
            method: method.to_owned(),
            params,
        }
    }
}

/// A JSON-RPC response envelope.
///
/// Unknown fields are retained in `extra` so that forwarding a node's
/// response does not silently drop data the node chose to include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// The JSON-RPC protocol version, echoed from the request.
    pub jsonrpc: String,

    /// The correlation id, echoed from the request.
    pub id: u64,

    /// The result of a successful call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// The error object of a failed call, forwarded unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Any additional fields present in the envelope.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl JsonRpcResponse {
    /// Builds a successful response envelope echoing the request's
    /// `jsonrpc` and `id`.
    pub fn result(request: &JsonRpcRequest, result: Value) -> Self {
        Self {
            jsonrpc: request.jsonrpc.clone(),
            id: request.id,
            result: Some(result),
            error: None,
            extra: serde_json::Map::new(),
        }
    }
}
