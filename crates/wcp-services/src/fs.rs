//! File service: item CRUD, reads, and debounced edits in the active workspace.

use std::time::Instant;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use wcp_protocol::{HandlerResult, Methods, WCPError};
use wcp_vfs::{CreateOptions, RenameOptions};

use crate::params::{parse_params, parse_params_optional, with_warnings};
use crate::{Service, SharedRegistry};

pub struct FsService {
    registry: SharedRegistry,
}

impl FsService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

impl Service for FsService {
    fn namespace(&self) -> &str {
        "fs"
    }

    async fn handle(&self, method: &str, params: Option<Value>) -> HandlerResult {
        let mut registry = self.registry.lock();
        let result = match method {
            Methods::FS_CREATE => {
                let p: CreateParams = parse_params(params)?;
                let opts = CreateOptions {
                    allow_overwrite: p.allow_overwrite,
                    temporary_buffer: p.temporary_buffer,
                };
                let path = registry.create_item(&p.path, p.content, opts)?;
                json!({ "path": path })
            }

            Methods::FS_RENAME => {
                let p: RenameParams = parse_params(params)?;
                let opts = RenameOptions {
                    skip_validation: false,
                    allow_override: p.allow_override,
                };
                let path = registry.rename_item(&p.from, &p.to, opts)?;
                json!({ "path": path })
            }

            Methods::FS_MOVE => {
                let p: MoveParams = parse_params(params)?;
                let path = registry.move_item(&p.path, &p.destination)?;
                json!({ "path": path })
            }

            Methods::FS_DELETE => {
                let p: PathParam = parse_params(params)?;
                registry.delete_item(&p.path)?;
                json!({ "success": true })
            }

            Methods::FS_LIST => {
                let p: ListParams = parse_params_optional(params)?;
                let items = registry.list(p.path.as_deref().unwrap_or("/"))?;
                json!({ "items": items })
            }

            Methods::FS_TREE => {
                let items = registry.items()?;
                json!({ "workspace": registry.current_name(), "items": items })
            }

            Methods::FS_READ => {
                let p: PathParam = parse_params(params)?;
                json!({ "content": registry.read_file(&p.path)? })
            }

            Methods::FS_EXISTS => {
                let p: PathParam = parse_params(params)?;
                json!({ "exists": registry.exists(&p.path)? })
            }

            Methods::FS_ITEM_TYPE => {
                let p: PathParam = parse_params(params)?;
                json!({ "type": registry.item_type(&p.path)? })
            }

            Methods::FS_EDIT => {
                let p: ContentParams = parse_params(params)?;
                registry.edit_file(&p.path, p.content, Instant::now())?;
                json!({ "pending": registry.pending_edits() })
            }

            Methods::FS_SAVE => {
                let p: ContentParams = parse_params(params)?;
                registry.save_file(&p.path, p.content)?;
                json!({ "success": true })
            }

            Methods::FS_FLUSH => {
                let flushed = registry.flush_all();
                debug!("Flushed {} pending edit(s)", flushed);
                json!({ "flushed": flushed })
            }

            _ => return Err(WCPError::method_not_found(method)),
        };
        Ok(with_warnings(&mut registry, result))
    }

    /// Nothing typed may be lost on a clean stop.
    async fn shutdown(&self) {
        let flushed = self.registry.lock().flush_all();
        if flushed > 0 {
            debug!("Flushed {} pending edit(s) on shutdown", flushed);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    path: String,
    content: Option<String>,
    #[serde(default)]
    allow_overwrite: bool,
    #[serde(default)]
    temporary_buffer: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameParams {
    from: String,
    to: String,
    #[serde(default)]
    allow_override: bool,
}

#[derive(Deserialize)]
struct MoveParams {
    path: String,
    destination: String,
}

#[derive(Deserialize)]
struct PathParam {
    path: String,
}

#[derive(Deserialize, Default)]
struct ListParams {
    path: Option<String>,
}

#[derive(Deserialize)]
struct ContentParams {
    path: String,
    content: String,
}
