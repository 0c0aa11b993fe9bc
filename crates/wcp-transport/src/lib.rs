//! WCP Transport Layer
//!
//! WebSocket transport for the WCP server. The transport handles:
//! - Connection lifecycle (open, message, close)
//! - Token handshake
//! - Notification broadcasting to authenticated clients
//!
//! The transport is decoupled from the server logic via the `RequestHandler` trait.

pub mod client;
pub mod server;

pub use client::ClientConnection;
pub use server::{RequestHandler, TransportConfig, TransportError, TransportServer, SERVER_VERSION};
