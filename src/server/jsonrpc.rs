//! JSON-RPC 2.0 envelopes and the closed set of methods the bridge serves.
//!
//! Payload types (`InitializeResult`, `Tool`, `CallToolResult`, `ErrorData`)
//! come from `rmcp::model`; the envelopes stay lenient so that malformed
//! input can still be answered with a proper error.

use crate::Error;
use rmcp::model::{ErrorCode, ErrorData, JsonRpcVersion2_0};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request identifier; a string or a number, echoed back verbatim
pub type RequestId = Value;

/// Incoming request or notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    /// Absent for notifications; a `null` id is treated as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// `params` of `initialize`; only the requested version is looked at, and only for logging.
/// Any JSON value is accepted there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<Value>,
}

/// `params` of `tools/call`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Every method the bridge distinguishes
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Initialize(InitializeParams),
    ListTools,
    CallTool(CallToolParams),
    Ping,
    /// Any `notifications/*` message
    Notification(String),
    Unknown(String),
}

impl Method {
    /// Classify a request; malformed params on a known method are an invalid argument
    pub fn parse(method: &str, params: Option<Value>) -> Result<Self, Error> {
        Ok(match method {
            // params are only logged
            "initialize" => Self::Initialize(parse_params(params).unwrap_or_default()),
            "tools/list" => Self::ListTools,
            "tools/call" => Self::CallTool(parse_params(params)?),
            "ping" => Self::Ping,
            other if other.starts_with("notifications/") => Self::Notification(other.to_string()),
            other => Self::Unknown(other.to_string()),
        })
    }
}

fn parse_params<T>(params: Option<Value>) -> Result<T, Error>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| Error::InvalidArgument {
            field: "params".to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Outgoing response; exactly one of `result` / `error` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion2_0,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorData>,
}

impl JsonRpcResponse {
    /// Success response; a missing id is reported as `null`
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion2_0,
            id: Some(id.unwrap_or(Value::Null)),
            result: Some(result),
            error: None,
        }
    }

    /// Error response; a missing id is reported as `null`
    pub fn failure(id: Option<RequestId>, error: &Error) -> Self {
        Self {
            jsonrpc: JsonRpcVersion2_0,
            id: Some(id.unwrap_or(Value::Null)),
            result: None,
            error: Some(ErrorData::from(error)),
        }
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}
