//! Per-connection state.

use std::time::{Duration, Instant};

use wcp_protocol::auth::{AuthState, ClientInfo};

#[derive(Debug)]
pub struct ClientConnection {
    pub id: String,
    pub connected_at: Instant,
    pub auth_state: AuthState,
    /// Set after a successful handshake
    pub session_id: Option<String>,
    pub client_info: Option<ClientInfo>,
    pub last_activity: Instant,
    /// Requests answered on this connection
    pub requests: u64,
}

impl ClientConnection {
    pub fn new(id: String) -> Self {
        let now = Instant::now();
        Self {
            id,
            connected_at: now,
            auth_state: AuthState::Pending,
            session_id: None,
            client_info: None,
            last_activity: now,
            requests: 0,
        }
    }

    /// A connection on a server that requires no token.
    pub fn new_authenticated(id: String) -> Self {
        let mut conn = Self::new(id);
        conn.auth_state = AuthState::Authenticated;
        conn
    }

    pub fn authenticate(&mut self, session_id: String, client_info: Option<ClientInfo>) {
        self.auth_state = AuthState::Authenticated;
        self.session_id = Some(session_id);
        self.client_info = client_info;
    }

    pub fn reject(&mut self) {
        self.auth_state = AuthState::Rejected;
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_state == AuthState::Authenticated
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
