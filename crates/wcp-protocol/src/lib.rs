//! WCP (Workspace Command Protocol) - Protocol Types
//!
//! JSON-RPC 2.0 types for driving a playground workspace over a socket.
//! This crate is the single source of truth for method names, notification
//! names, and error codes, including the mapping of core errors onto them.

pub mod auth;
pub mod error;
pub mod jsonrpc;
pub mod methods;
pub mod notifications;

pub use auth::{
    AuthConfig, AuthErrorCode, AuthRequiredParams, AuthState, ClientInfo, HandshakeParams,
    HandshakeResult,
};
pub use error::{WCPError, WCPErrorCode};
pub use jsonrpc::{
    HandlerResult, RequestId, WCPErrorResponse, WCPNotification, WCPRequest, WCPResponse,
    WCPSuccessResponse,
};
pub use methods::{MethodName, Methods};
pub use notifications::{NotificationName, Notifications};
