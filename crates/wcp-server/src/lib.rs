//! WCP Server: routes JSON-RPC requests to service adapters.
//!
//! The server owns all services and the middleware chain, bridges core
//! events onto the notification channel, drives the auto-save ticker, and
//! provides the `RequestHandler` implementation for the transport layer.

pub mod autosave;
pub mod context;
pub mod middleware;
pub mod notify;
pub mod router;

pub use autosave::AutoSaveTicker;
pub use context::ServerContext;
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, Verdict};
pub use router::WCPServer;
