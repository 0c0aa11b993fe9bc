//! Config service: user settings with defaults, a schema, and a JSONC file.
//!
//! `files.autoSaveDelay` is live: setting it retunes the registry's
//! debounce window immediately.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use wcp_protocol::{HandlerResult, Methods, WCPError};
use wcp_vfs::Framework;

use crate::params::{parse_params, parse_params_optional};
use crate::{Service, SharedRegistry};

pub const AUTO_SAVE_DELAY: &str = "files.autoSaveDelay";
pub const DEFAULT_FRAMEWORK: &str = "workspace.defaultFramework";

/// Cloneable handle to the current settings map.
#[derive(Clone)]
pub struct Settings {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            values: Arc::new(RwLock::new(default_settings())),
        }
    }
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    pub fn all(&self) -> HashMap<String, Value> {
        self.values.read().clone()
    }

    /// Framework used when `workspace/create` names none.
    pub fn default_framework(&self) -> Framework {
        self.get(DEFAULT_FRAMEWORK)
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or_default()
    }

    pub fn autosave_delay(&self) -> Option<Duration> {
        self.get(AUTO_SAVE_DELAY)
            .and_then(|v| v.as_u64())
            .map(Duration::from_millis)
    }

    fn insert(&self, key: String, value: Value) {
        self.values.write().insert(key, value);
    }

    fn merge(&self, parsed: HashMap<String, Value>) {
        let mut values = self.values.write();
        for (key, value) in parsed {
            values.insert(key, value);
        }
    }

    fn reset(&self, key: Option<&str>) {
        let defaults = default_settings();
        let mut values = self.values.write();
        match key {
            Some(key) => match defaults.get(key) {
                Some(value) => {
                    values.insert(key.to_string(), value.clone());
                }
                None => {
                    values.remove(key);
                }
            },
            None => *values = defaults,
        }
    }
}

pub struct ConfigService {
    settings: Settings,
    registry: SharedRegistry,
    /// Directory holding `settings.jsonc`; `None` skips loading.
    settings_dir: Option<PathBuf>,
}

impl ConfigService {
    pub fn new(settings: Settings, registry: SharedRegistry, settings_dir: Option<PathBuf>) -> Self {
        Self {
            settings,
            registry,
            settings_dir,
        }
    }

    /// Load overrides from `settings.jsonc`, falling back to `settings.json`.
    async fn load_settings(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(dir) = &self.settings_dir else {
            return Ok(());
        };
        for path in [dir.join("settings.jsonc"), dir.join("settings.json")] {
            if let Ok(content) = tokio::fs::read_to_string(&path).await {
                let stripped = strip_jsonc_comments(&content);
                let parsed: HashMap<String, Value> = serde_json::from_str(&stripped)
                    .map_err(|e| format!("{}: {e}", path.display()))?;
                self.settings.merge(parsed);
                info!("Loaded settings from {}", path.display());
                break;
            }
        }
        Ok(())
    }

    fn apply_autosave_delay(&self) {
        if let Some(delay) = self.settings.autosave_delay() {
            self.registry.lock().set_autosave_debounce(delay);
            debug!("Auto-save delay set to {:?}", delay);
        }
    }
}

impl Service for ConfigService {
    fn namespace(&self) -> &str {
        "config"
    }

    async fn init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.load_settings().await?;
        self.apply_autosave_delay();
        Ok(())
    }

    async fn handle(&self, method: &str, params: Option<Value>) -> HandlerResult {
        match method {
            Methods::CONFIG_GET => {
                let p: ConfigGetParam = parse_params(params)?;
                let value = self.settings.get(&p.key).unwrap_or(Value::Null);
                Ok(json!({ "value": value }))
            }

            Methods::CONFIG_SET => {
                let p: ConfigSetParam = parse_params(params)?;
                validate_setting(&p.key, &p.value)?;
                self.settings.insert(p.key.clone(), p.value);
                if p.key == AUTO_SAVE_DELAY {
                    self.apply_autosave_delay();
                }
                Ok(json!({ "success": true }))
            }

            Methods::CONFIG_GET_ALL => Ok(json!({ "settings": self.settings.all() })),

            Methods::CONFIG_RESET => {
                let p: ConfigResetParam = parse_params_optional(params)?;
                self.settings.reset(p.key.as_deref());
                if p.key.as_deref().is_none_or(|k| k == AUTO_SAVE_DELAY) {
                    self.apply_autosave_delay();
                }
                Ok(json!({ "success": true }))
            }

            Methods::CONFIG_SCHEMA => Ok(json!({ "schema": config_schema() })),

            _ => Err(WCPError::method_not_found(method)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Params
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ConfigGetParam {
    key: String,
}

#[derive(Deserialize)]
struct ConfigSetParam {
    key: String,
    value: Value,
}

#[derive(Deserialize, Default)]
struct ConfigResetParam {
    key: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Reject values the core would misinterpret. Unknown keys pass through.
fn validate_setting(key: &str, value: &Value) -> Result<(), WCPError> {
    match key {
        AUTO_SAVE_DELAY if value.as_u64().is_none() => Err(WCPError::invalid_params(format!(
            "{AUTO_SAVE_DELAY} must be a non-negative integer (ms)"
        ))),
        DEFAULT_FRAMEWORK => {
            let name = value
                .as_str()
                .ok_or_else(|| WCPError::invalid_params(format!("{DEFAULT_FRAMEWORK} must be a string")))?;
            name.parse::<Framework>()?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn default_settings() -> HashMap<String, Value> {
    let mut s = HashMap::new();
    s.insert(AUTO_SAVE_DELAY.into(), json!(500));
    s.insert(DEFAULT_FRAMEWORK.into(), json!("native"));
    s.insert("editor.fontSize".into(), json!(14));
    s.insert("editor.tabSize".into(), json!(4));
    s.insert("editor.insertSpaces".into(), json!(true));
    s.insert("editor.wordWrap".into(), json!("off"));
    s.insert("editor.lineNumbers".into(), json!(true));
    s
}

fn config_schema() -> Value {
    json!({
        "files.autoSaveDelay": { "type": "number", "default": 500, "description": "Milliseconds of quiet before an edit is saved" },
        "workspace.defaultFramework": { "type": "string", "default": "native", "enum": ["native", "anchor", "seahorse"], "description": "Template for new workspaces" },
        "editor.fontSize": { "type": "number", "default": 14, "description": "Editor font size" },
        "editor.tabSize": { "type": "number", "default": 4, "description": "Tab size in spaces" },
        "editor.insertSpaces": { "type": "boolean", "default": true, "description": "Insert spaces when pressing Tab" },
        "editor.wordWrap": { "type": "string", "default": "off", "description": "Word wrap mode" },
        "editor.lineNumbers": { "type": "boolean", "default": true, "description": "Show line numbers" },
    })
}

/// Strip `//` line comments and `/* */` block comments, leaving string
/// literals untouched.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}
