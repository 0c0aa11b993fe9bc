//! Workspace service: create, switch, rename, and delete named workspaces,
//! plus the scratch workspace and per-workspace program id.

use serde::Deserialize;
use serde_json::{json, Value};
use wcp_protocol::{HandlerResult, Methods, WCPError};
use wcp_vfs::{Framework, SeedFile, SourceLanguage, WorkspaceRegistry};

use crate::config::Settings;
use crate::params::{parse_params, parse_params_optional, with_warnings};
use crate::{Service, SharedRegistry};

pub struct WorkspaceService {
    registry: SharedRegistry,
    settings: Settings,
}

impl WorkspaceService {
    pub fn new(registry: SharedRegistry, settings: Settings) -> Self {
        Self { registry, settings }
    }

    fn framework_or_default(&self, name: Option<&str>) -> Result<Framework, WCPError> {
        match name {
            Some(name) => Ok(name.parse()?),
            None => Ok(self.settings.default_framework()),
        }
    }
}

impl Service for WorkspaceService {
    fn namespace(&self) -> &str {
        "workspace"
    }

    async fn handle(&self, method: &str, params: Option<Value>) -> HandlerResult {
        let mut registry = self.registry.lock();
        let result = match method {
            Methods::WORKSPACE_CREATE => {
                let p: CreateParams = parse_params(params)?;
                let framework = self.framework_or_default(p.framework.as_deref())?;
                registry.create(&p.name, framework, p.seed)?;
                json!({ "name": p.name, "current": registry.current_name() })
            }

            Methods::WORKSPACE_SWITCH => {
                let p: NameParam = parse_params(params)?;
                registry.switch_to(&p.name)?;
                json!({ "current": registry.current_name() })
            }

            Methods::WORKSPACE_RENAME => {
                let p: RenameParams = parse_params(params)?;
                registry.rename(&p.from, &p.to)?;
                json!({ "name": p.to, "current": registry.current_name() })
            }

            Methods::WORKSPACE_DELETE => {
                let p: NameParam = parse_params(params)?;
                registry.delete(&p.name)?;
                json!({ "success": true })
            }

            Methods::WORKSPACE_LIST => json!({
                "workspaces": registry.names(),
                "current": registry.current_name(),
                "scratch": registry.is_scratch_active(),
            }),

            Methods::WORKSPACE_CURRENT => json!({ "workspace": describe_current(&registry) }),

            Methods::WORKSPACE_OPEN_SCRATCH => {
                let p: ScratchParams = parse_params_optional(params)?;
                let framework = self.framework_or_default(p.framework.as_deref())?;
                registry.open_scratch(framework, p.seed)?;
                json!({ "current": registry.current_name() })
            }

            Methods::WORKSPACE_SET_PROGRAM_ID => {
                let p: ProgramIdParams = parse_params(params)?;
                registry.set_program_id(p.program_id.as_deref())?;
                json!({ "programId": p.program_id })
            }

            Methods::WORKSPACE_FRAMEWORKS => {
                let frameworks: Vec<Value> = Framework::ALL
                    .into_iter()
                    .map(|f| {
                        json!({
                            "name": f.name(),
                            "language": match f.language() {
                                SourceLanguage::Rust => "rust",
                                SourceLanguage::Python => "python",
                            },
                            "defaultOpenFile": f.default_open_file(),
                        })
                    })
                    .collect();
                json!({ "frameworks": frameworks, "default": self.settings.default_framework() })
            }

            _ => return Err(WCPError::method_not_found(method)),
        };
        Ok(with_warnings(&mut registry, result))
    }
}

/// Summary of the active workspace, or `null` when there is none.
fn describe_current(registry: &WorkspaceRegistry) -> Value {
    let Ok(workspace) = registry.current() else {
        return Value::Null;
    };
    json!({
        "name": workspace.name(),
        "framework": workspace.framework(),
        "programId": workspace.program_id(),
        "temporary": workspace.is_temporary(),
        "tabs": workspace.tabs().tabs(),
        "currentFile": workspace.tabs().current(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateParams {
    name: String,
    framework: Option<String>,
    seed: Option<Vec<SeedFile>>,
}

#[derive(Deserialize, Default)]
struct ScratchParams {
    framework: Option<String>,
    seed: Option<Vec<SeedFile>>,
}

#[derive(Deserialize)]
struct NameParam {
    name: String,
}

#[derive(Deserialize)]
struct RenameParams {
    from: String,
    to: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgramIdParams {
    program_id: Option<String>,
}
