//! Wire types for the calculator's line-delimited JSON-RPC 2.0 server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use abacus_core::{AbacusError, Screen};

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// The calculator refused an input. Its state is unchanged.
pub const INPUT_REJECTED: i64 = -32001;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
    }
}

// ---------------------------------------------------------------------------
// Tool results
// ---------------------------------------------------------------------------

/// Structured result of a `tools/call`, tagged by `kind`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    Screen(Screen),
    History { entries: Vec<HistoryEntry> },
    HistoryCleared { removed: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// 0 is the most recent result.
    pub index: usize,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Calculator(#[from] AbacusError),
}

impl ToolError {
    pub fn code(&self) -> i64 {
        match self {
            Self::UnknownTool(_) | Self::MissingField(_) => INVALID_PARAMS,
            Self::Calculator(AbacusError::ValidationRejected(_)) => INPUT_REJECTED,
            Self::Calculator(_) => INTERNAL_ERROR,
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(err: ToolError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
