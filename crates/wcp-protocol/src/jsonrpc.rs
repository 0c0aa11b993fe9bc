//! JSON-RPC 2.0 message types for WCP.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WCPError;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request ID: either a string or integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WCPRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WCPSuccessResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// `id` is null when the request could not be parsed far enough to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WCPErrorResponse {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    pub error: WCPError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WCPResponse {
    Success(WCPSuccessResponse),
    Error(WCPErrorResponse),
}

/// Server → client message with no id; no reply is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WCPNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Result from a service handler.
pub type HandlerResult = Result<Value, WCPError>;

impl WCPRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: method.into(),
            params,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION && !self.method.is_empty()
    }

    /// Parse one incoming text frame.
    ///
    /// On failure the error response carries whatever id could be salvaged.
    pub fn parse(text: &str) -> Result<Self, WCPErrorResponse> {
        let value: Value = serde_json::from_str(text)
            .map_err(|_| WCPErrorResponse::new(None, WCPError::parse_error("Failed to parse JSON")))?;
        let id: Option<RequestId> = value
            .get("id")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok());

        match serde_json::from_value::<WCPRequest>(value) {
            Ok(request) if request.is_valid() => Ok(request),
            _ => Err(WCPErrorResponse::new(
                id,
                WCPError::invalid_request("Invalid JSON-RPC 2.0 request"),
            )),
        }
    }
}

impl WCPSuccessResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result,
        }
    }
}

impl WCPErrorResponse {
    pub fn new(id: Option<RequestId>, error: WCPError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            error,
        }
    }
}

impl WCPNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
        }
    }

    /// Serialized form, ready for a text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl WCPResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Success(WCPSuccessResponse::new(id, result))
    }

    pub fn error(id: Option<RequestId>, error: WCPError) -> Self {
        Self::Error(WCPErrorResponse::new(id, error))
    }

    /// Build the reply to a request from its handler's outcome.
    pub fn from_result(id: RequestId, result: HandlerResult) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(error) => Self::error(Some(id), error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<WCPErrorResponse> for WCPResponse {
    fn from(value: WCPErrorResponse) -> Self {
        Self::Error(value)
    }
}
