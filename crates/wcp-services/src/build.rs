//! Build service: the compile inputs of the active workspace.

use serde_json::{json, Value};
use tracing::debug;
use wcp_protocol::{HandlerResult, Methods, WCPError};

use crate::{Service, SharedRegistry};

pub struct BuildService {
    registry: SharedRegistry,
}

impl BuildService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

impl Service for BuildService {
    fn namespace(&self) -> &str {
        "build"
    }

    async fn handle(&self, method: &str, _params: Option<Value>) -> HandlerResult {
        match method {
            Methods::BUILD_FILES => {
                let registry = self.registry.lock();
                let files = registry.build_files()?;
                let workspace = registry.current()?;
                debug!("Build inputs for {}: {} file(s)", workspace.name(), files.len());
                Ok(json!({
                    "workspace": workspace.name(),
                    "framework": workspace.framework(),
                    "programId": workspace.program_id(),
                    "files": files,
                }))
            }
            _ => Err(WCPError::method_not_found(method)),
        }
    }
}
