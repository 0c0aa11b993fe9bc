//! WCP notification names and the mapping from core events onto them.
//!
//! Notifications are server-to-client messages with no response expected.

use serde_json::Value;
use wcp_vfs::VfsEvent;

use crate::jsonrpc::WCPNotification;

pub struct Notifications;

impl Notifications {
    // ── Authentication ──────────────────────────────────────────────────
    pub const AUTH_REQUIRED: &'static str = "auth/required";

    // ── Server lifecycle ────────────────────────────────────────────────
    pub const SERVER_CONNECTED: &'static str = "server/connected";

    // ── File system ─────────────────────────────────────────────────────
    pub const FS_DID_CREATE: &'static str = "fs/didCreate";
    pub const FS_DID_RENAME: &'static str = "fs/didRename";
    pub const FS_DID_DELETE: &'static str = "fs/didDelete";
    pub const FS_DID_SAVE: &'static str = "fs/didSave";

    // ── Tabs ────────────────────────────────────────────────────────────
    pub const TAB_DID_OPEN_FILE: &'static str = "tab/didOpenFile";
    pub const TAB_DID_CLOSE: &'static str = "tab/didClose";

    // ── Workspace ───────────────────────────────────────────────────────
    pub const WORKSPACE_DID_SWITCH: &'static str = "workspace/didSwitch";
    pub const WORKSPACE_DID_INITIALIZE: &'static str = "workspace/didInitialize";
    pub const WORKSPACE_DID_CREATE: &'static str = "workspace/didCreate";
    pub const WORKSPACE_DID_RENAME: &'static str = "workspace/didRename";
    pub const WORKSPACE_DID_DELETE: &'static str = "workspace/didDelete";
}

/// Notification method for a core event.
pub fn method_for(event: &VfsEvent) -> NotificationName {
    match event {
        VfsEvent::ItemCreated { .. } => Notifications::FS_DID_CREATE,
        VfsEvent::ItemRenamed { .. } => Notifications::FS_DID_RENAME,
        VfsEvent::ItemDeleted { .. } => Notifications::FS_DID_DELETE,
        VfsEvent::FileSaved { .. } => Notifications::FS_DID_SAVE,
        VfsEvent::FileOpened { .. } => Notifications::TAB_DID_OPEN_FILE,
        VfsEvent::TabClosed { .. } => Notifications::TAB_DID_CLOSE,
        VfsEvent::WorkspaceCreated { .. } => Notifications::WORKSPACE_DID_CREATE,
        VfsEvent::WorkspaceRenamed { .. } => Notifications::WORKSPACE_DID_RENAME,
        VfsEvent::WorkspaceDeleted { .. } => Notifications::WORKSPACE_DID_DELETE,
        VfsEvent::WorkspaceSwitched { .. } => Notifications::WORKSPACE_DID_SWITCH,
        VfsEvent::WorkspaceInitialized { .. } => Notifications::WORKSPACE_DID_INITIALIZE,
    }
}

/// Wrap a core event as a notification. The params are the event's fields;
/// the `event` tag is dropped since the method already names it.
pub fn from_event(event: &VfsEvent) -> WCPNotification {
    let params = match serde_json::to_value(event) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("event");
            Some(Value::Object(fields))
        }
        _ => None,
    };
    WCPNotification::new(method_for(event), params)
}

pub type NotificationName = &'static str;
