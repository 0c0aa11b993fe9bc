//! Typed, synchronous publish/subscribe for tree and workspace changes.
//!
//! Handlers run on the publishing thread, in subscription order, before
//! `publish` returns. The handler list is snapshotted per dispatch, so a
//! handler may subscribe or dispose without deadlocking the bus.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use crate::path::VfsPath;
use crate::tree::ItemKind;

/// A change announced by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum VfsEvent {
    ItemCreated {
        workspace: String,
        path: VfsPath,
        item_type: ItemKind,
    },
    ItemRenamed {
        workspace: String,
        from: VfsPath,
        to: VfsPath,
    },
    ItemDeleted {
        workspace: String,
        path: VfsPath,
    },
    FileSaved {
        workspace: String,
        path: VfsPath,
    },
    FileOpened {
        workspace: String,
        path: VfsPath,
        content: String,
    },
    TabClosed {
        workspace: String,
        path: VfsPath,
    },
    WorkspaceCreated {
        name: String,
    },
    WorkspaceRenamed {
        from: String,
        to: String,
    },
    WorkspaceDeleted {
        name: String,
    },
    WorkspaceSwitched {
        from: Option<String>,
        to: String,
    },
    WorkspaceInitialized {
        current: Option<String>,
        workspaces: Vec<String>,
    },
}

/// One channel per event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ItemCreated,
    ItemRenamed,
    ItemDeleted,
    FileSaved,
    FileOpened,
    TabClosed,
    WorkspaceCreated,
    WorkspaceRenamed,
    WorkspaceDeleted,
    WorkspaceSwitched,
    WorkspaceInitialized,
}

impl VfsEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ItemCreated { .. } => EventKind::ItemCreated,
            Self::ItemRenamed { .. } => EventKind::ItemRenamed,
            Self::ItemDeleted { .. } => EventKind::ItemDeleted,
            Self::FileSaved { .. } => EventKind::FileSaved,
            Self::FileOpened { .. } => EventKind::FileOpened,
            Self::TabClosed { .. } => EventKind::TabClosed,
            Self::WorkspaceCreated { .. } => EventKind::WorkspaceCreated,
            Self::WorkspaceRenamed { .. } => EventKind::WorkspaceRenamed,
            Self::WorkspaceDeleted { .. } => EventKind::WorkspaceDeleted,
            Self::WorkspaceSwitched { .. } => EventKind::WorkspaceSwitched,
            Self::WorkspaceInitialized { .. } => EventKind::WorkspaceInitialized,
        }
    }
}

type Handler = Arc<dyn Fn(&VfsEvent) + Send + Sync>;

struct Entry {
    id: u64,
    /// `None` receives every kind.
    kind: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Cloneable handle to a shared subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.inner.lock().entries.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&VfsEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.insert(Some(kind), Arc::new(handler))
    }

    /// Register a handler for every event kind.
    pub fn subscribe_all(&self, handler: impl Fn(&VfsEvent) + Send + Sync + 'static) -> Subscription {
        self.insert(None, Arc::new(handler))
    }

    /// Deliver `event` to its subscribers before returning.
    pub fn publish(&self, event: &VfsEvent) {
        let kind = event.kind();
        let handlers: Vec<Handler> = self
            .inner
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.kind.is_none_or(|k| k == kind))
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    fn insert(&self, kind: Option<EventKind>, handler: Handler) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry { id, kind, handler });
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping it keeps the handler registered; call [`dispose`](Self::dispose)
/// to remove it.
#[must_use = "keep the subscription to be able to dispose it"]
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    pub fn dispose(self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.lock().entries.retain(|entry| entry.id != self.id);
        }
    }
}
