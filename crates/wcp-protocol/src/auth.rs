//! Token handshake that gates every WebSocket connection.
//!
//! A client has `timeout` ms after `auth/required` to send `auth/handshake`
//! with the server's token. Until then every other request is answered with
//! [`AuthErrorCode::NotAuthenticated`]; a wrong token closes the connection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{WCPError, WCPErrorCode};

/// Handshake deadline used when none is configured.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 10_000;

/// Who is connecting, as reported by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// e.g. "playground-web"
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Params of `auth/handshake`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeParams {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
}

/// Params of the `auth/required` greeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequiredParams {
    pub server_version: String,
    pub timeout: u64,
}

/// Result of a successful `auth/handshake`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResult {
    pub client_id: String,
    pub session_id: String,
    pub server_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Pending,
    Authenticated,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token: String,
    pub handshake_timeout_ms: u64,
}

impl AuthConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
        }
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Compare `candidate` against the token without short-circuiting on
    /// the first differing byte.
    pub fn accepts(&self, candidate: &str) -> bool {
        let expected = self.token.as_bytes();
        let given = candidate.as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected.iter().zip(given).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }

    pub fn greeting(&self, server_version: &str) -> AuthRequiredParams {
        AuthRequiredParams {
            server_version: server_version.to_string(),
            timeout: self.handshake_timeout_ms,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Handshake failures, reported in -32010..-32012.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    NotAuthenticated,
    InvalidToken,
    HandshakeTimeout,
}

impl AuthErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::NotAuthenticated => -32010,
            Self::InvalidToken => -32011,
            Self::HandshakeTimeout => -32012,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Not authenticated. Send auth/handshake first.",
            Self::InvalidToken => "Invalid authentication token",
            Self::HandshakeTimeout => "Authentication timeout",
        }
    }
}

impl From<AuthErrorCode> for WCPError {
    fn from(code: AuthErrorCode) -> Self {
        WCPError::new(WCPErrorCode::Custom(code.code()), code.message())
    }
}
