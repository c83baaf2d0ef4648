//! JSON-RPC 2.0 envelopes used by the MCP stdio transport.
//!
//! Incoming lines are either requests (carry an `id`, get exactly one reply)
//! or notifications (no `id`, never answered). Ids are integers or strings;
//! `null` ids are rejected.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP revision spoken by this server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "padstack-mcp";

const JSONRPC_VERSION: &str = "2.0";

/// Request id, echoed back in the reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer id.
    Number(i64),
    /// String id.
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => n.fmt(f),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Client request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol tag, `"2.0"`.
    pub jsonrpc: String,
    /// Id to answer to.
    pub id: RequestId,
    /// Method name.
    pub method: String,
    /// Method arguments.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns the first structural problem with this request, if any.
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        if self.jsonrpc != JSONRPC_VERSION {
            Some("jsonrpc must be \"2.0\"")
        } else if self.method.is_empty() {
            Some("method must not be empty")
        } else {
            None
        }
    }
}

/// Client notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol tag, `"2.0"`.
    pub jsonrpc: String,
    /// Notification name.
    pub method: String,
    /// Notification payload.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Id of the answered request.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps `result` as the reply to `id`.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// JSON-RPC error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The line was not JSON.
    ParseError,
    /// JSON, but not a request or notification.
    InvalidRequest,
    /// Unknown method.
    MethodNotFound,
    /// Arguments of the wrong shape.
    InvalidParams,
    /// Failure inside the server.
    InternalError,
    /// Implementation-defined code in -32099..=-32000.
    ServerError(i32),
}

impl ErrorCode {
    /// Numeric value sent on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ServerError(code) => code,
        }
    }

    /// Message used when no specific one is given.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ServerError(_) => "Server error",
        }
    }
}

/// Body of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// Error code.
    pub code: i32,
    /// Human readable message.
    pub message: String,
    /// Extra detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Error with the code's default message.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// Error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches `data`.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Error reply. `id` is absent when the request could not be identified.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Id of the failed request, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Error body.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Builds an error reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }

    /// Unparseable input.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, JsonRpcErrorData::from_code(ErrorCode::ParseError))
    }

    /// Malformed envelope.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(id, JsonRpcErrorData::from_code(ErrorCode::InvalidRequest))
    }

    /// Request rejected because of the session state.
    #[must_use]
    pub fn invalid_state(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, message),
        )
    }

    /// Unknown method.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Unknown method: {method}"),
            ),
        )
    }

    /// Bad arguments.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        )
    }

    /// Server-side failure.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }
}

/// A decoded input line.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Needs a reply.
    Request(JsonRpcRequest),
    /// Fire and forget.
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// Method or notification name.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(r) => &r.method,
            Self::Notification(n) => &n.method,
        }
    }

    /// Attached parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn params(&self) -> Option<&Value> {
        match self {
            Self::Request(r) => r.params.as_ref(),
            Self::Notification(n) => n.params.as_ref(),
        }
    }

    /// Request id; `None` for notifications.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(r) => Some(&r.id),
            Self::Notification(_) => None,
        }
    }
}

/// Decodes one line of input.
///
/// The presence of an `id` key decides between request and notification.
///
/// # Errors
///
/// `ParseError` for invalid JSON or a non-object, `InvalidRequest` for a
/// wrong `jsonrpc` tag or missing fields. The id is echoed when it could be
/// read.
pub fn parse_message(line: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(line).map_err(|_| JsonRpcError::parse_error())?;
    let Some(obj) = value.as_object() else {
        return Err(JsonRpcError::parse_error());
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        let id = obj
            .get("id")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        return Err(JsonRpcError::invalid_request(id));
    }

    if obj.contains_key("id") {
        let request: JsonRpcRequest =
            serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
        if request.validate().is_some() {
            return Err(JsonRpcError::invalid_request(Some(request.id)));
        }
        Ok(IncomingMessage::Request(request))
    } else {
        serde_json::from_value(value)
            .map(IncomingMessage::Notification)
            .map_err(|_| JsonRpcError::invalid_request(None))
    }
}
