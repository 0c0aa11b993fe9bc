//! WCP method name constants, grouped by namespace.
//!
//! Each constant is the exact string sent as the `method` field of a
//! JSON-RPC request.

pub struct Methods;

impl Methods {
    // ── File system ─────────────────────────────────────────────────────
    pub const FS_CREATE: &'static str = "fs/create";
    pub const FS_RENAME: &'static str = "fs/rename";
    pub const FS_MOVE: &'static str = "fs/move";
    pub const FS_DELETE: &'static str = "fs/delete";
    pub const FS_LIST: &'static str = "fs/list";
    pub const FS_TREE: &'static str = "fs/tree";
    pub const FS_READ: &'static str = "fs/read";
    pub const FS_EXISTS: &'static str = "fs/exists";
    pub const FS_ITEM_TYPE: &'static str = "fs/itemType";
    pub const FS_EDIT: &'static str = "fs/edit";
    pub const FS_SAVE: &'static str = "fs/save";
    pub const FS_FLUSH: &'static str = "fs/flush";

    // ── Workspace ───────────────────────────────────────────────────────
    pub const WORKSPACE_CREATE: &'static str = "workspace/create";
    pub const WORKSPACE_SWITCH: &'static str = "workspace/switch";
    pub const WORKSPACE_RENAME: &'static str = "workspace/rename";
    pub const WORKSPACE_DELETE: &'static str = "workspace/delete";
    pub const WORKSPACE_LIST: &'static str = "workspace/list";
    pub const WORKSPACE_CURRENT: &'static str = "workspace/current";
    pub const WORKSPACE_OPEN_SCRATCH: &'static str = "workspace/openScratch";
    pub const WORKSPACE_SET_PROGRAM_ID: &'static str = "workspace/setProgramId";
    pub const WORKSPACE_FRAMEWORKS: &'static str = "workspace/frameworks";

    // ── Tabs ────────────────────────────────────────────────────────────
    pub const TAB_OPEN: &'static str = "tab/open";
    pub const TAB_CLOSE: &'static str = "tab/close";
    pub const TAB_FOCUS: &'static str = "tab/focus";
    pub const TAB_LIST: &'static str = "tab/list";
    pub const TAB_CURRENT: &'static str = "tab/current";
    pub const TAB_SAVE_POSITION: &'static str = "tab/savePosition";
    pub const TAB_POSITION: &'static str = "tab/position";

    // ── Build ───────────────────────────────────────────────────────────
    pub const BUILD_FILES: &'static str = "build/files";

    // ── Config ──────────────────────────────────────────────────────────
    pub const CONFIG_GET: &'static str = "config/get";
    pub const CONFIG_SET: &'static str = "config/set";
    pub const CONFIG_GET_ALL: &'static str = "config/getAll";
    pub const CONFIG_RESET: &'static str = "config/reset";
    pub const CONFIG_SCHEMA: &'static str = "config/schema";

    // ── Auth ────────────────────────────────────────────────────────────
    pub const AUTH_HANDSHAKE: &'static str = "auth/handshake";
}

/// Namespaces served by a WCP server.
pub const NAMESPACES: &[&str] = &["fs", "workspace", "tab", "build", "config", "auth"];

/// True if the method belongs to a namespace this protocol defines.
pub fn is_known_method(method: &str) -> bool {
    match method.split_once('/') {
        Some((namespace, rest)) => !rest.is_empty() && NAMESPACES.contains(&namespace),
        None => false,
    }
}

pub type MethodName = &'static str;
