//! Tab service: open tabs, focus, and saved editor positions.

use serde::Deserialize;
use serde_json::{json, Value};
use wcp_protocol::{HandlerResult, Methods, WCPError};
use wcp_vfs::Position;

use crate::params::{parse_params, with_warnings};
use crate::{Service, SharedRegistry};

pub struct TabService {
    registry: SharedRegistry,
}

impl TabService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

impl Service for TabService {
    fn namespace(&self) -> &str {
        "tab"
    }

    async fn handle(&self, method: &str, params: Option<Value>) -> HandlerResult {
        let mut registry = self.registry.lock();
        let result = match method {
            Methods::TAB_OPEN => {
                let p: PathParam = parse_params(params)?;
                let content = registry.open_file(&p.path)?;
                json!({
                    "content": content,
                    "position": registry.position(&p.path)?,
                })
            }

            Methods::TAB_CLOSE => {
                let p: PathParam = parse_params(params)?;
                let closed = registry.close_tab(&p.path)?;
                json!({ "closed": closed, "current": registry.current_file()? })
            }

            Methods::TAB_FOCUS => {
                let p: PathParam = parse_params(params)?;
                registry.focus(&p.path)?;
                json!({ "current": registry.current_file()? })
            }

            Methods::TAB_LIST => json!({
                "tabs": registry.open_tabs()?,
                "current": registry.current_file()?,
            }),

            Methods::TAB_CURRENT => json!({ "path": registry.current_file()? }),

            Methods::TAB_SAVE_POSITION => {
                let p: PositionParams = parse_params(params)?;
                registry.save_position(&p.path, p.position);
                json!({ "success": true })
            }

            Methods::TAB_POSITION => {
                let p: PathParam = parse_params(params)?;
                json!({ "position": registry.position(&p.path)? })
            }

            _ => return Err(WCPError::method_not_found(method)),
        };
        Ok(with_warnings(&mut registry, result))
    }
}

#[derive(Deserialize)]
struct PathParam {
    path: String,
}

#[derive(Deserialize)]
struct PositionParams {
    path: String,
    position: Position,
}
