//! WCP Service Implementations
//!
//! Each service implements the `Service` trait and handles a namespace of
//! JSON-RPC methods. Services are registered with the WCP server router
//! which dispatches requests by method prefix.
//!
//! Every workspace-facing service shares one [`SharedRegistry`]. A request
//! holds the lock for its whole handler, so events reach subscribers in the
//! order the mutations happened.

pub mod build;
pub mod config;
pub mod fs;
pub mod params;
pub mod tab;
pub mod workspace;

use std::sync::Arc;

use parking_lot::Mutex;
use wcp_protocol::HandlerResult;
use wcp_vfs::WorkspaceRegistry;

pub use build::BuildService;
pub use config::{ConfigService, Settings};
pub use fs::FsService;
pub use tab::TabService;
pub use workspace::WorkspaceService;

/// The registry every service operates on.
pub type SharedRegistry = Arc<Mutex<WorkspaceRegistry>>;

/// Trait implemented by all WCP services.
///
/// Each service handles a namespace of methods (e.g., "fs/*", "tab/*").
pub trait Service: Send + Sync {
    /// The namespace prefix this service handles (e.g., "fs", "workspace").
    fn namespace(&self) -> &str;

    /// Handle a JSON-RPC request within this service's namespace.
    ///
    /// `method` is the full method string (e.g., "fs/read").
    fn handle(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> impl std::future::Future<Output = HandlerResult> + Send;

    /// Initialize the service (called once at startup).
    fn init(&self) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send {
        async { Ok(()) }
    }

    /// Shutdown the service (called once at server shutdown).
    fn shutdown(&self) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }
}
