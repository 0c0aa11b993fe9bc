//! Parameter decoding and response helpers shared by the services.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use wcp_protocol::WCPError;
use wcp_vfs::WorkspaceRegistry;

pub fn parse_params<T: for<'de> Deserialize<'de>>(params: Option<Value>) -> Result<T, WCPError> {
    match params {
        Some(v) => serde_json::from_value(v)
            .map_err(|e| WCPError::invalid_params(format!("Invalid parameters: {e}"))),
        None => Err(WCPError::invalid_params("Parameters required")),
    }
}

/// Like [`parse_params`] but missing params fall back to `T::default()`.
/// Params that are present must still decode.
pub fn parse_params_optional<T: for<'de> Deserialize<'de> + Default>(
    params: Option<Value>,
) -> Result<T, WCPError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        some => parse_params(some),
    }
}

/// Attach any persistence warnings the registry collected to `result`.
///
/// The mutation already happened in memory; the client is told that it may
/// not survive a restart.
pub fn with_warnings(registry: &mut WorkspaceRegistry, mut result: Value) -> Value {
    let warnings = registry.take_warnings();
    if warnings.is_empty() {
        return result;
    }
    for w in &warnings {
        warn!("Persistence degraded at {}: {}", w.key, w.message);
    }
    if let Value::Object(fields) = &mut result {
        fields.insert("warnings".into(), json!(warnings));
    }
    result
}
