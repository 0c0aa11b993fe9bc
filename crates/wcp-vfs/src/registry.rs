//! WorkspaceRegistry: the set of named workspaces, the active one, and
//! every operation that mutates them.
//!
//! All mutations go through here so that the store, the auto-save queue and
//! the event bus stay in step with the in-memory tree. Structural changes are
//! written to the store immediately; content edits wait in the debounce queue
//! until [`WorkspaceRegistry::flush_due`] (or a switch, a tab close, or an
//! explicit save) applies them.
//!
//! Pending edits always belong to the active workspace: anything that makes
//! another workspace active flushes the queue first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::autosave::{AutoSave, DEFAULT_DEBOUNCE};
use crate::build::{self, BuildFile};
use crate::bus::{EventBus, VfsEvent};
use crate::error::{Result, VfsError};
use crate::framework::{Framework, SeedFile};
use crate::path::VfsPath;
use crate::store::{keys, Store, StoreError};
use crate::tabs::Position;
use crate::tree::{CreateOptions, Item, ItemKind, RenameOptions, TreeDelta};
use crate::workspace::{validate_workspace_name, Workspace, WorkspaceMeta, SCRATCH_NAME};

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub autosave_debounce: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// A store write that failed after startup. The in-memory state already
/// reflects the change; only durability was lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistWarning {
    pub key: String,
    pub message: String,
}

enum Active {
    Nothing,
    Named(String),
    Scratch(Box<Workspace>),
}

pub struct WorkspaceRegistry {
    names: Vec<String>,
    loaded: HashMap<String, Workspace>,
    active: Active,
    autosave: AutoSave<VfsPath, String>,
    bus: EventBus,
    persist: Persistence,
}

impl std::fmt::Debug for WorkspaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceRegistry")
            .field("names", &self.names)
            .field("active", &self.current_name())
            .field("pending_edits", &self.autosave.len())
            .finish_non_exhaustive()
    }
}

impl WorkspaceRegistry {
    /// Load the registry from `store` and announce it on `bus`.
    ///
    /// Store failures here are fatal; after this point they become
    /// [`PersistWarning`]s.
    pub fn init(store: Arc<dyn Store>, bus: EventBus, config: RegistryConfig) -> Result<Self> {
        let names: Vec<String> = match store.get(keys::WORKSPACES)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::from)?,
            None => Vec::new(),
        };
        let marker = store
            .get(keys::ACTIVE)?
            .map(|bytes| String::from_utf8(bytes).map_err(|_| StoreError::Utf8(keys::ACTIVE.into())))
            .transpose()?;
        let active_name = marker
            .filter(|name| names.contains(name))
            .or_else(|| names.first().cloned());

        let mut loaded = HashMap::new();
        let active = match active_name {
            Some(name) => {
                loaded.insert(name.clone(), load_workspace(store.as_ref(), &name)?);
                Active::Named(name)
            }
            None => Active::Nothing,
        };

        let registry = Self {
            names,
            loaded,
            active,
            autosave: AutoSave::new(config.autosave_debounce),
            bus,
            persist: Persistence {
                store,
                warnings: Vec::new(),
            },
        };

        info!(
            "Workspace registry initialized: {} workspaces, active: {:?}",
            registry.names.len(),
            registry.current_name()
        );
        registry.bus.publish(&registry.initialized_event());
        Ok(registry)
    }

    /// The `WorkspaceInitialized` event for the registry as it stands now,
    /// for observers that subscribe after `init`.
    pub fn initialized_event(&self) -> VfsEvent {
        VfsEvent::WorkspaceInitialized {
            current: self.current_name().map(str::to_string),
            workspaces: self.names.clone(),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Registered workspace names in creation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn current_name(&self) -> Option<&str> {
        match &self.active {
            Active::Named(name) => Some(name),
            Active::Scratch(_) => Some(SCRATCH_NAME),
            Active::Nothing => None,
        }
    }

    pub fn is_scratch_active(&self) -> bool {
        matches!(self.active, Active::Scratch(_))
    }

    pub fn current(&self) -> Result<&Workspace> {
        match &self.active {
            Active::Named(name) => self.loaded.get(name).ok_or(VfsError::NoActiveWorkspace),
            Active::Scratch(workspace) => Ok(&**workspace),
            Active::Nothing => Err(VfsError::NoActiveWorkspace),
        }
    }

    /// A workspace that has been loaded this session.
    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        self.loaded.get(name)
    }

    /// Drain persistence failures recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<PersistWarning> {
        std::mem::take(&mut self.persist.warnings)
    }

    // ── Workspace lifecycle ───────────────────────────────────────────────

    /// Register a workspace seeded from `seed`, or from the framework
    /// template when `seed` is `None`. The first workspace becomes active.
    pub fn create(&mut self, name: &str, framework: Framework, seed: Option<Vec<SeedFile>>) -> Result<()> {
        validate_workspace_name(name)?;
        if self.names.iter().any(|n| n == name) {
            return Err(VfsError::DuplicateName(name.to_string()));
        }
        let workspace = build_workspace(Workspace::new(name, framework), seed)?;

        self.persist.write_workspace(&workspace);
        self.names.push(name.to_string());
        self.persist.write_names(&self.names);
        self.loaded.insert(name.to_string(), workspace);

        info!("Workspace created: {} ({})", name, framework);
        self.bus.publish(&VfsEvent::WorkspaceCreated {
            name: name.to_string(),
        });

        if matches!(self.active, Active::Nothing) {
            self.active = Active::Named(name.to_string());
            self.persist.write_active(Some(name));
            self.bus.publish(&VfsEvent::WorkspaceSwitched {
                from: None,
                to: name.to_string(),
            });
        }
        Ok(())
    }

    /// Make `name` the active workspace.
    ///
    /// Pending edits of the outgoing workspace are written and its tabs
    /// persisted before `WorkspaceSwitched` is published.
    pub fn switch_to(&mut self, name: &str) -> Result<()> {
        if !self.names.iter().any(|n| n == name) {
            return Err(VfsError::NotFound(name.to_string()));
        }
        if matches!(&self.active, Active::Named(current) if current == name) {
            return Ok(());
        }
        if !self.loaded.contains_key(name) {
            let workspace = load_workspace(self.persist.store.as_ref(), name)?;
            self.loaded.insert(name.to_string(), workspace);
        }

        let from = self.leave_active();
        self.active = Active::Named(name.to_string());
        self.persist.write_active(Some(name));

        info!("Switched workspace: {:?} -> {}", from, name);
        self.bus.publish(&VfsEvent::WorkspaceSwitched {
            from,
            to: name.to_string(),
        });
        Ok(())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        validate_workspace_name(new)?;
        let index = self
            .names
            .iter()
            .position(|n| n == old)
            .ok_or_else(|| VfsError::NotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if self.names.iter().any(|n| n == new) {
            return Err(VfsError::DuplicateName(new.to_string()));
        }

        let mut workspace = match self.loaded.remove(old) {
            Some(workspace) => workspace,
            None => load_workspace(self.persist.store.as_ref(), old)?,
        };
        workspace.set_name(new.to_string());

        self.persist.write_workspace(&workspace);
        self.persist.purge(old);
        self.loaded.insert(new.to_string(), workspace);
        self.names[index] = new.to_string();
        self.persist.write_names(&self.names);

        if let Active::Named(current) = &mut self.active {
            if current == old {
                *current = new.to_string();
                self.persist.write_active(Some(new));
            }
        }

        info!("Workspace renamed: {} -> {}", old, new);
        self.bus.publish(&VfsEvent::WorkspaceRenamed {
            from: old.to_string(),
            to: new.to_string(),
        });
        Ok(())
    }

    /// Unregister a workspace and purge everything stored for it.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))?;
        if matches!(&self.active, Active::Named(current) if current == name) {
            return Err(VfsError::CannotDeleteCurrent(name.to_string()));
        }

        self.names.remove(index);
        self.loaded.remove(name);
        self.persist.purge(name);
        self.persist.write_names(&self.names);

        info!("Workspace deleted: {}", name);
        self.bus.publish(&VfsEvent::WorkspaceDeleted {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Activate a throwaway workspace. It is never written to the store and
    /// is discarded as soon as another workspace becomes active.
    pub fn open_scratch(&mut self, framework: Framework, seed: Option<Vec<SeedFile>>) -> Result<()> {
        let workspace = build_workspace(Workspace::scratch(framework), seed)?;

        let from = self.leave_active();
        self.active = Active::Scratch(Box::new(workspace));

        info!("Opened scratch workspace ({})", framework);
        self.bus.publish(&VfsEvent::WorkspaceSwitched {
            from,
            to: SCRATCH_NAME.to_string(),
        });
        Ok(())
    }

    /// Set or clear the program id substituted into build inputs.
    pub fn set_program_id(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            build::validate_program_id(id)?;
        }
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        workspace.set_program_id(id.map(str::to_string));
        self.persist.write_meta(workspace);
        Ok(())
    }

    // ── Items ─────────────────────────────────────────────────────────────

    pub fn create_item(&mut self, path: &str, content: Option<String>, opts: CreateOptions) -> Result<VfsPath> {
        let path = VfsPath::parse(path)?;
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        let delta = workspace.create_item(&path, content, opts)?;

        for replaced in delta.removed.iter().chain(&delta.updated) {
            self.autosave.cancel(replaced);
        }
        self.persist.apply_delta(workspace, &delta);
        debug!("Created {} in {}", path, workspace.name());
        publish_delta(&self.bus, workspace.name(), &delta);
        Ok(path)
    }

    /// Rename or move an item. Returns the item's new path.
    pub fn rename_item(&mut self, old: &str, new: &str, opts: RenameOptions) -> Result<VfsPath> {
        let old = VfsPath::parse(old)?;
        let new = VfsPath::parse(new)?;
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        let delta = workspace.rename_item(&old, &new, opts)?;

        for removed in &delta.removed {
            self.autosave.cancel(removed);
        }
        for (from, to) in &delta.renamed {
            self.autosave.rekey(from, to.clone());
        }
        self.persist.apply_delta(workspace, &delta);
        publish_delta(&self.bus, workspace.name(), &delta);

        let target = match delta.renamed.first() {
            Some((_, to)) => to.clone(),
            None => workspace.tree().resolve(&old).unwrap_or(old),
        };
        debug!("Renamed to {} in {}", target, workspace.name());
        Ok(target)
    }

    /// Move an item into `dest_dir`, keeping its name.
    pub fn move_item(&mut self, path: &str, dest_dir: &str) -> Result<VfsPath> {
        let source = VfsPath::parse(path)?;
        let dest = VfsPath::parse(dest_dir)?.as_dir();
        let key = self
            .current()?
            .tree()
            .resolve(&source)
            .ok_or_else(|| VfsError::NotFound(source.to_string()))?;
        if key.is_root() {
            return Err(VfsError::InvalidPath("cannot move the root".into()));
        }
        let target = dest.join(key.file_name(), key.is_dir())?;
        self.rename_item(key.as_str(), target.as_str(), RenameOptions::default())
    }

    /// Delete an item and its subtree. Deleting a missing path succeeds.
    pub fn delete_item(&mut self, path: &str) -> Result<()> {
        let path = VfsPath::parse(path)?;
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        let delta = workspace.delete_item(&path)?;
        if delta.is_empty() {
            return Ok(());
        }

        for removed in &delta.removed {
            self.autosave.cancel(removed);
        }
        self.persist.apply_delta(workspace, &delta);
        debug!("Deleted {} ({} items) in {}", path, delta.removed.len(), workspace.name());
        publish_delta(&self.bus, workspace.name(), &delta);
        Ok(())
    }

    /// Direct children of `dir`, with unflushed edits applied.
    pub fn list(&self, dir: &str) -> Result<Vec<Item>> {
        let dir = VfsPath::parse(dir)?;
        let workspace = self.current()?;
        let dir = workspace.tree().resolve(&dir).unwrap_or(dir);
        Ok(workspace
            .tree()
            .list(&dir)?
            .into_iter()
            .map(|item| self.with_pending(item))
            .collect())
    }

    /// Every item of the active workspace, in path order.
    pub fn items(&self) -> Result<Vec<Item>> {
        Ok(self
            .current()?
            .tree()
            .items()
            .map(|item| self.with_pending(item))
            .collect())
    }

    /// Latest content of a file, including an unflushed edit.
    pub fn read_file(&self, path: &str) -> Result<String> {
        let path = VfsPath::parse(path)?;
        if let Some(pending) = self.autosave.peek(&path) {
            return Ok(pending.clone());
        }
        self.current()?
            .tree()
            .file_content(&path)
            .map(str::to_string)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        let path = VfsPath::parse(path)?;
        Ok(self.current()?.tree().exists(&path))
    }

    pub fn item_type(&self, path: &str) -> Result<Option<ItemKind>> {
        let path = VfsPath::parse(path)?;
        Ok(self.current()?.tree().item_type(&path))
    }

    fn with_pending(&self, item: &Item) -> Item {
        match (item, self.autosave.peek(item.path())) {
            (
                Item::File {
                    path,
                    is_temporary_buffer,
                    ..
                },
                Some(pending),
            ) => Item::File {
                path: path.clone(),
                content: pending.clone(),
                is_temporary_buffer: *is_temporary_buffer,
            },
            _ => item.clone(),
        }
    }

    // ── Tabs ──────────────────────────────────────────────────────────────

    /// Open (or focus) a tab and return the file's latest content.
    pub fn open_file(&mut self, path: &str) -> Result<String> {
        let path = VfsPath::parse(path)?;
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        let stored = workspace
            .tree()
            .file_content(&path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        let content = match self.autosave.peek(&path) {
            Some(pending) => pending.clone(),
            None => stored.to_string(),
        };

        workspace.tabs_mut().open(&path);
        self.persist.write_meta(workspace);
        self.bus.publish(&VfsEvent::FileOpened {
            workspace: workspace.name().to_string(),
            path,
            content: content.clone(),
        });
        Ok(content)
    }

    /// Close a tab, writing any pending edit for it first.
    ///
    /// Returns false when the file was not open.
    pub fn close_tab(&mut self, path: &str) -> Result<bool> {
        let path = VfsPath::parse(path)?;
        if let Some(content) = self.autosave.cancel(&path) {
            self.apply_content(&path, content)?;
        }

        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        if !workspace.tabs_mut().close(&path) {
            return Ok(false);
        }
        self.persist.write_meta(workspace);
        self.bus.publish(&VfsEvent::TabClosed {
            workspace: workspace.name().to_string(),
            path,
        });
        Ok(true)
    }

    pub fn focus(&mut self, path: &str) -> Result<()> {
        let path = VfsPath::parse(path)?;
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        if !workspace.tabs_mut().focus(&path) {
            return Err(VfsError::NotFound(path.to_string()));
        }
        self.persist.write_meta(workspace);
        Ok(())
    }

    /// Remember where the editor was in an open file. Anything else, an
    /// unparsable path or no active workspace included, is ignored.
    pub fn save_position(&mut self, path: &str, position: Position) {
        let Ok(path) = VfsPath::parse(path) else {
            debug!("Ignored position for invalid path {path:?}");
            return;
        };
        let Ok(workspace) = active_mut(&mut self.active, &mut self.loaded) else {
            return;
        };
        if workspace.tabs().is_open(&path) {
            workspace.tabs_mut().save_position(&path, position);
            self.persist.write_meta(workspace);
        }
    }

    pub fn position(&self, path: &str) -> Result<Option<Position>> {
        let path = VfsPath::parse(path)?;
        Ok(self.current()?.tabs().position(&path))
    }

    pub fn open_tabs(&self) -> Result<Vec<VfsPath>> {
        Ok(self.current()?.tabs().tabs().to_vec())
    }

    pub fn current_file(&self) -> Result<Option<VfsPath>> {
        Ok(self.current()?.tabs().current().cloned())
    }

    // ── Content ───────────────────────────────────────────────────────────

    /// Buffer an edit and restart the file's auto-save timer.
    pub fn edit_file(&mut self, path: &str, content: String, now: Instant) -> Result<()> {
        let path = VfsPath::parse(path)?;
        if self.current()?.tree().file_content(&path).is_none() {
            return Err(VfsError::NotFound(path.to_string()));
        }
        debug!("Buffered edit for {}", path);
        self.autosave.touch(path, content, now);
        Ok(())
    }

    /// Write content now, superseding any pending edit.
    pub fn save_file(&mut self, path: &str, content: String) -> Result<()> {
        let path = VfsPath::parse(path)?;
        if self.current()?.tree().file_content(&path).is_none() {
            return Err(VfsError::NotFound(path.to_string()));
        }
        self.autosave.cancel(&path);
        self.apply_content(&path, content)
    }

    /// Apply every edit whose timer expired at `now`. Returns how many.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let due = self.autosave.due(now);
        self.apply_pending(due)
    }

    /// Apply every pending edit regardless of its timer.
    pub fn flush_all(&mut self) -> usize {
        let pending = self.autosave.take_matching(|_| true);
        self.apply_pending(pending)
    }

    pub fn pending_edits(&self) -> usize {
        self.autosave.len()
    }

    pub fn next_autosave_deadline(&self) -> Option<Instant> {
        self.autosave.next_deadline()
    }

    pub fn set_autosave_debounce(&mut self, window: Duration) {
        self.autosave.set_window(window);
    }

    fn apply_pending(&mut self, entries: Vec<(VfsPath, String)>) -> usize {
        let count = entries.len();
        for (path, content) in entries {
            if let Err(e) = self.apply_content(&path, content) {
                warn!("Dropped pending edit for {}: {}", path, e);
            }
        }
        count
    }

    fn apply_content(&mut self, path: &VfsPath, content: String) -> Result<()> {
        let workspace = active_mut(&mut self.active, &mut self.loaded)?;
        let delta = workspace.update_content(path, content)?;
        self.persist.apply_delta(workspace, &delta);
        publish_delta(&self.bus, workspace.name(), &delta);
        Ok(())
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Compile inputs for the active workspace, pending edits included.
    pub fn build_files(&self) -> Result<Vec<BuildFile>> {
        let workspace = self.current()?;
        let overlay: HashMap<VfsPath, String> = self
            .autosave
            .iter()
            .map(|(path, content)| (path.clone(), content.clone()))
            .collect();
        build::build_files(workspace, &overlay)
    }

    // ── Internal ──────────────────────────────────────────────────────────

    /// Flush and persist the outgoing workspace, returning its name.
    fn leave_active(&mut self) -> Option<String> {
        self.flush_all();
        match std::mem::replace(&mut self.active, Active::Nothing) {
            Active::Named(name) => {
                if let Some(workspace) = self.loaded.get(&name) {
                    self.persist.write_meta(workspace);
                }
                Some(name)
            }
            Active::Scratch(_) => Some(SCRATCH_NAME.to_string()),
            Active::Nothing => None,
        }
    }
}

fn active_mut<'a>(
    active: &'a mut Active,
    loaded: &'a mut HashMap<String, Workspace>,
) -> Result<&'a mut Workspace> {
    match active {
        Active::Named(name) => loaded.get_mut(name.as_str()).ok_or(VfsError::NoActiveWorkspace),
        Active::Scratch(workspace) => Ok(workspace.as_mut()),
        Active::Nothing => Err(VfsError::NoActiveWorkspace),
    }
}

/// Seed a fresh workspace; a template seed also opens the default file.
fn build_workspace(mut workspace: Workspace, seed: Option<Vec<SeedFile>>) -> Result<Workspace> {
    let framework = workspace.framework();
    match seed {
        Some(files) => workspace.seed(&files)?,
        None => {
            workspace.seed(&framework.template())?;
            let default = VfsPath::parse(framework.default_open_file())?;
            if workspace.tree().file_content(&default).is_some() {
                workspace.tabs_mut().open(&default);
            }
        }
    }
    Ok(workspace)
}

/// Announce a tree change. Only the roots of removed subtrees and the
/// renamed item itself are reported; descendants are implied.
fn publish_delta(bus: &EventBus, workspace: &str, delta: &TreeDelta) {
    for path in &delta.removed {
        let parent_removed = path.parent().is_ok_and(|parent| delta.removed.contains(&parent));
        if !parent_removed {
            bus.publish(&VfsEvent::ItemDeleted {
                workspace: workspace.to_string(),
                path: path.clone(),
            });
        }
    }
    for path in &delta.created {
        bus.publish(&VfsEvent::ItemCreated {
            workspace: workspace.to_string(),
            path: path.clone(),
            item_type: if path.is_dir() {
                ItemKind::Directory
            } else {
                ItemKind::File
            },
        });
    }
    if let Some((from, to)) = delta.renamed.first() {
        bus.publish(&VfsEvent::ItemRenamed {
            workspace: workspace.to_string(),
            from: from.clone(),
            to: to.clone(),
        });
    }
    for path in &delta.updated {
        bus.publish(&VfsEvent::FileSaved {
            workspace: workspace.to_string(),
            path: path.clone(),
        });
    }
}

fn load_workspace(store: &dyn Store, name: &str) -> Result<Workspace> {
    let meta: WorkspaceMeta = match store.get(&keys::meta(name))? {
        Some(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::from)?,
        None => WorkspaceMeta::default(),
    };

    let prefix = keys::items_prefix(name);
    let mut tree = Workspace::empty_tree(meta.framework);
    for key in store.list_prefix(&prefix)? {
        // The prefix ends with the root separator, which the path keeps.
        let path = VfsPath::parse(&key[prefix.len() - 1..])?;
        if path.is_root() {
            continue;
        }
        let content = if path.is_dir() {
            None
        } else {
            let bytes = store.get(&key)?.unwrap_or_default();
            Some(String::from_utf8(bytes).map_err(|_| StoreError::Utf8(key.clone()))?)
        };
        tree.create_item(
            &path,
            content,
            CreateOptions {
                allow_overwrite: true,
                temporary_buffer: false,
            },
        )?;
    }

    debug!("Loaded workspace {} ({} items)", name, tree.len());
    Ok(Workspace::from_parts(name.to_string(), meta, tree))
}

// ─────────────────────────────────────────────────────────────────────────────
// Store writes (failures become warnings)
// ─────────────────────────────────────────────────────────────────────────────

struct Persistence {
    store: Arc<dyn Store>,
    warnings: Vec<PersistWarning>,
}

impl Persistence {
    fn check(&mut self, key: &str, result: std::result::Result<(), StoreError>) {
        if let Err(e) = result {
            warn!("Failed to persist {}: {}", key, e);
            self.warnings.push(PersistWarning {
                key: key.to_string(),
                message: e.to_string(),
            });
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) {
        let result = self.store.put(key, value);
        self.check(key, result);
    }

    fn delete(&mut self, key: &str) {
        let result = self.store.delete(key);
        self.check(key, result);
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.put(key, &bytes),
            Err(e) => self.check(key, Err(e.into())),
        }
    }

    fn write_names(&mut self, names: &[String]) {
        self.put_json(keys::WORKSPACES, &names);
    }

    fn write_active(&mut self, name: Option<&str>) {
        match name {
            Some(name) => self.put(keys::ACTIVE, name.as_bytes()),
            None => self.delete(keys::ACTIVE),
        }
    }

    fn write_meta(&mut self, workspace: &Workspace) {
        if workspace.is_temporary() {
            return;
        }
        self.put_json(&keys::meta(workspace.name()), &workspace.meta());
    }

    fn write_item(&mut self, workspace: &Workspace, path: &VfsPath) {
        if workspace.is_temporary() || path.is_root() {
            return;
        }
        let key = keys::item(workspace.name(), path);
        match workspace.tree().get(path) {
            Some(item) if item.is_temporary_buffer() => self.delete(&key),
            Some(Item::File { content, .. }) => self.put(&key, content.as_bytes()),
            Some(Item::Directory { .. }) => self.put(&key, b""),
            None => {}
        }
    }

    fn write_workspace(&mut self, workspace: &Workspace) {
        if workspace.is_temporary() {
            return;
        }
        self.write_meta(workspace);
        for item in workspace.tree().items() {
            self.write_item(workspace, item.path());
        }
    }

    /// Mirror a tree change. Tabs may have moved with it, so meta is
    /// rewritten whenever items were removed or renamed.
    fn apply_delta(&mut self, workspace: &Workspace, delta: &TreeDelta) {
        if workspace.is_temporary() {
            return;
        }
        let name = workspace.name();
        for path in &delta.removed {
            self.delete(&keys::item(name, path));
        }
        for (from, to) in &delta.renamed {
            self.delete(&keys::item(name, from));
            self.write_item(workspace, to);
        }
        for path in delta.created.iter().chain(&delta.updated) {
            self.write_item(workspace, path);
        }
        if !delta.removed.is_empty() || !delta.renamed.is_empty() {
            self.write_meta(workspace);
        }
    }

    fn purge(&mut self, name: &str) {
        let prefix = keys::items_prefix(name);
        let result = self.store.delete_prefix(&prefix);
        self.check(&prefix, result);
        self.delete(&keys::meta(name));
    }
}
