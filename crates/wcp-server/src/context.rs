//! Server context: the registry, settings, and event bus one server drives.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use wcp_services::{Settings, SharedRegistry};
use wcp_vfs::{EventBus, RegistryConfig, Store, WorkspaceRegistry};

/// Everything a running server shares between its services, the
/// notification bridge, and the auto-save ticker.
#[derive(Clone)]
pub struct ServerContext {
    /// Unique server instance identifier
    pub id: String,
    pub registry: SharedRegistry,
    pub settings: Settings,
    /// Directory holding `settings.jsonc`; `None` for in-memory servers
    pub data_dir: Option<PathBuf>,
    bus: EventBus,
}

impl ServerContext {
    /// Load the registry from `store`. Fails only if the stored state
    /// cannot be read.
    pub fn open(
        store: Arc<dyn Store>,
        config: RegistryConfig,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, wcp_vfs::VfsError> {
        let bus = EventBus::new();
        let registry = WorkspaceRegistry::init(store, bus.clone(), config)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            registry: Arc::new(Mutex::new(registry)),
            settings: Settings::default(),
            data_dir,
            bus,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("id", &self.id)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}
