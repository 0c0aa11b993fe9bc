//! WCP error types: standard JSON-RPC 2.0 codes plus workspace errors.

use serde::{Deserialize, Serialize};
use serde_json::json;
use wcp_vfs::VfsError;

/// Standard JSON-RPC 2.0 error codes, server errors, and the workspace
/// error range (-32100 to -32109).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WCPErrorCode {
    // JSON-RPC 2.0 standard errors
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,

    // Server errors
    ServerError,
    ServerNotInitialized,
    ServerShuttingDown,

    // Workspace errors
    InvalidPath,
    InvalidName,
    AlreadyExists,
    NotFound,
    DuplicateName,
    NoParent,
    CannotDeleteCurrent,
    NoSourceFiles,
    NoActiveWorkspace,
    StoreError,

    Custom(i32),
}

impl WCPErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ServerError => -32000,
            Self::ServerNotInitialized => -32001,
            Self::ServerShuttingDown => -32002,
            Self::InvalidPath => -32100,
            Self::InvalidName => -32101,
            Self::AlreadyExists => -32102,
            Self::NotFound => -32103,
            Self::DuplicateName => -32104,
            Self::NoParent => -32105,
            Self::CannotDeleteCurrent => -32106,
            Self::NoSourceFiles => -32107,
            Self::NoActiveWorkspace => -32108,
            Self::StoreError => -32109,
            Self::Custom(c) => *c,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::ServerError,
            -32001 => Self::ServerNotInitialized,
            -32002 => Self::ServerShuttingDown,
            -32100 => Self::InvalidPath,
            -32101 => Self::InvalidName,
            -32102 => Self::AlreadyExists,
            -32103 => Self::NotFound,
            -32104 => Self::DuplicateName,
            -32105 => Self::NoParent,
            -32106 => Self::CannotDeleteCurrent,
            -32107 => Self::NoSourceFiles,
            -32108 => Self::NoActiveWorkspace,
            -32109 => Self::StoreError,
            c => Self::Custom(c),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl WCPError {
    pub fn new(code: WCPErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(WCPErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(WCPErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(WCPErrorCode::MethodNotFound, format!("Method not found: {method}"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(WCPErrorCode::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(WCPErrorCode::InternalError, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(WCPErrorCode::ServerError, message)
    }

    pub fn not_initialized() -> Self {
        Self::new(WCPErrorCode::ServerNotInitialized, "Server is not initialized")
    }

    pub fn shutting_down() -> Self {
        Self::new(WCPErrorCode::ServerShuttingDown, "Server is shutting down")
    }

    pub fn error_code(&self) -> WCPErrorCode {
        WCPErrorCode::from_code(self.code)
    }
}

impl From<VfsError> for WCPError {
    fn from(err: VfsError) -> Self {
        let code = match &err {
            VfsError::InvalidPath(_) => WCPErrorCode::InvalidPath,
            VfsError::InvalidName(_) => WCPErrorCode::InvalidName,
            VfsError::AlreadyExists(_) => WCPErrorCode::AlreadyExists,
            VfsError::NotFound(_) => WCPErrorCode::NotFound,
            VfsError::DuplicateName(_) => WCPErrorCode::DuplicateName,
            VfsError::NoParent => WCPErrorCode::NoParent,
            VfsError::CannotDeleteCurrent(_) => WCPErrorCode::CannotDeleteCurrent,
            VfsError::NoSourceFiles => WCPErrorCode::NoSourceFiles,
            VfsError::NoActiveWorkspace => WCPErrorCode::NoActiveWorkspace,
            VfsError::Store(_) => WCPErrorCode::StoreError,
        };
        Self::new(code, err.to_string()).with_data(json!({ "kind": err.kind() }))
    }
}

impl std::fmt::Display for WCPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WCP Error [{}]: {}", self.code, self.message)
    }
}

impl std::error::Error for WCPError {}
