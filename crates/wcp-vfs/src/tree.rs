//! File/folder tree for a single workspace.
//!
//! Items are keyed by normalized path in a `BTreeMap`, which keeps a
//! directory's subtree contiguous: every descendant of `/src/` sorts after
//! `/src/` and before the first key that no longer carries the prefix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VfsError};
use crate::framework::default_content;
use crate::path::{is_ancestor, validate_name, VfsPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Directory,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    File {
        path: VfsPath,
        content: String,
        #[serde(rename = "isTemporaryBuffer", default)]
        is_temporary_buffer: bool,
    },
    Directory {
        path: VfsPath,
    },
}

impl Item {
    pub fn path(&self) -> &VfsPath {
        match self {
            Self::File { path, .. } | Self::Directory { path } => path,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::File { .. } => ItemKind::File,
            Self::Directory { .. } => ItemKind::Directory,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::File { content, .. } => Some(content),
            Self::Directory { .. } => None,
        }
    }

    pub fn is_temporary_buffer(&self) -> bool {
        matches!(self, Self::File { is_temporary_buffer: true, .. })
    }

    fn set_path(&mut self, new_path: VfsPath) {
        match self {
            Self::File { path, .. } | Self::Directory { path } => *path = new_path,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Replace an existing item (or its opposite-kind twin) at the path.
    pub allow_overwrite: bool,
    /// Keep the file in memory only; it is never persisted.
    pub temporary_buffer: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    pub skip_validation: bool,
    pub allow_override: bool,
}

/// What a mutation changed, for persistence and notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDelta {
    /// New paths, parents before children.
    pub created: Vec<VfsPath>,
    /// Removed paths; the first entry is the root of each removed subtree.
    pub removed: Vec<VfsPath>,
    /// `(from, to)` pairs, the renamed item first.
    pub renamed: Vec<(VfsPath, VfsPath)>,
    /// Files whose content was replaced in place.
    pub updated: Vec<VfsPath>,
}

impl TreeDelta {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && self.renamed.is_empty()
            && self.updated.is_empty()
    }
}

/// The in-memory tree. The root directory always exists.
#[derive(Debug, Clone)]
pub struct FileTree {
    items: BTreeMap<VfsPath, Item>,
    priority_dir: Option<VfsPath>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    pub fn new() -> Self {
        let root = VfsPath::root();
        let mut items = BTreeMap::new();
        items.insert(root.clone(), Item::Directory { path: root });
        Self {
            items,
            priority_dir: None,
        }
    }

    /// A tree whose listings put `dir` ahead of other directories.
    pub fn with_priority_dir(dir: VfsPath) -> Self {
        Self {
            priority_dir: Some(dir.as_dir()),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    /// Map a caller path to the stored key.
    ///
    /// A file-form path (`/src`) resolves to an existing directory (`/src/`)
    /// when no file of that name exists.
    pub fn resolve(&self, path: &VfsPath) -> Option<VfsPath> {
        if self.items.contains_key(path) {
            return Some(path.clone());
        }
        if !path.is_dir() {
            let dir = path.as_dir();
            if self.items.contains_key(&dir) {
                return Some(dir);
            }
        }
        None
    }

    pub fn get(&self, path: &VfsPath) -> Option<&Item> {
        self.resolve(path).and_then(|key| self.items.get(&key))
    }

    pub fn exists(&self, path: &VfsPath) -> bool {
        self.resolve(path).is_some()
    }

    pub fn item_type(&self, path: &VfsPath) -> Option<ItemKind> {
        self.get(path).map(Item::kind)
    }

    pub fn file_content(&self, path: &VfsPath) -> Option<&str> {
        self.items.get(path).and_then(Item::content)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn files(&self) -> impl Iterator<Item = &Item> {
        self.items.values().filter(|item| item.kind() == ItemKind::File)
    }

    /// Every item strictly below `dir`, in key order.
    pub fn descendants<'a>(&'a self, dir: &VfsPath) -> impl Iterator<Item = &'a Item> + use<'a> {
        let prefix = dir.clone();
        let dir = dir.clone();
        self.items
            .range(dir.clone()..)
            .take_while(move |(key, _)| key.as_str().starts_with(prefix.as_str()))
            .filter(move |(key, _)| **key != dir)
            .map(|(_, item)| item)
    }

    /// Create a file or directory (by the path's trailing separator).
    pub fn create_item(
        &mut self,
        path: &VfsPath,
        content: Option<String>,
        opts: CreateOptions,
    ) -> Result<TreeDelta> {
        if path.is_root() {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }
        self.check_no_file_ancestor(path)?;

        let exists = self.items.contains_key(path);
        let twin = path.twin().filter(|t| self.items.contains_key(t));
        if !opts.allow_overwrite {
            if exists {
                return Err(VfsError::AlreadyExists(path.to_string()));
            }
            if let Some(twin) = twin {
                return Err(VfsError::AlreadyExists(twin.to_string()));
            }
        }

        let mut delta = TreeDelta::default();
        if let Some(twin) = twin {
            delta.removed = self.remove_subtree(&twin);
        }
        self.create_missing_ancestors(path, &mut delta);

        if path.is_dir() {
            if !exists {
                self.items.insert(path.clone(), Item::Directory { path: path.clone() });
                delta.created.push(path.clone());
            }
            return Ok(delta);
        }

        let content = content.unwrap_or_else(|| default_content(path.extension()).to_string());
        self.items.insert(
            path.clone(),
            Item::File {
                path: path.clone(),
                content,
                is_temporary_buffer: opts.temporary_buffer,
            },
        );
        if exists {
            delta.updated.push(path.clone());
        } else {
            delta.created.push(path.clone());
        }
        Ok(delta)
    }

    /// Replace the content of an existing file.
    pub fn update_content(&mut self, path: &VfsPath, new_content: String) -> Result<TreeDelta> {
        match self.items.get_mut(path) {
            Some(Item::File { content, .. }) => {
                *content = new_content;
                Ok(TreeDelta {
                    updated: vec![path.clone()],
                    ..TreeDelta::default()
                })
            }
            _ => Err(VfsError::NotFound(path.to_string())),
        }
    }

    /// Rename or move an item. Directory renames carry every descendant.
    pub fn rename_item(
        &mut self,
        old: &VfsPath,
        new: &VfsPath,
        opts: RenameOptions,
    ) -> Result<TreeDelta> {
        let old_key = self
            .resolve(old)
            .ok_or_else(|| VfsError::NotFound(old.to_string()))?;
        if old_key.is_root() {
            return Err(VfsError::InvalidPath("cannot rename the root".into()));
        }
        let new_key = if old_key.is_dir() {
            new.as_dir()
        } else {
            new.as_file()
                .ok_or_else(|| VfsError::InvalidPath(format!("{new} cannot name a file")))?
        };
        if new_key == old_key {
            return Ok(TreeDelta::default());
        }
        if !opts.skip_validation {
            validate_name(new_key.file_name())?;
        }
        if new_key.is_root() || is_ancestor(&old_key, &new_key) {
            return Err(VfsError::InvalidPath(format!("cannot move {old_key} into {new_key}")));
        }
        self.check_no_file_ancestor(&new_key)?;

        let conflicts: Vec<VfsPath> = std::iter::once(new_key.clone())
            .chain(new_key.twin())
            .filter(|p| self.items.contains_key(p))
            .collect();
        if let Some(first) = conflicts.first() {
            if !opts.allow_override {
                return Err(VfsError::AlreadyExists(first.to_string()));
            }
        }
        if conflicts
            .iter()
            .any(|c| is_ancestor(c, &old_key) || *c == old_key)
        {
            return Err(VfsError::InvalidPath(format!(
                "{new_key} would replace a directory containing {old_key}"
            )));
        }

        // Validation is complete; from here on nothing can fail.
        let mut delta = TreeDelta::default();
        for conflict in &conflicts {
            delta.removed.extend(self.remove_subtree(conflict));
        }

        let moved_keys: Vec<VfsPath> = std::iter::once(old_key.clone())
            .chain(self.descendants(&old_key).map(|item| item.path().clone()))
            .collect();
        let moved: Vec<Item> = moved_keys
            .iter()
            .filter_map(|key| self.items.remove(key))
            .collect();

        self.create_missing_ancestors(&new_key, &mut delta);

        for mut item in moved {
            let from = item.path().clone();
            let to = if old_key.is_dir() {
                from.rebase(&old_key, &new_key)
            } else {
                new_key.clone()
            };
            item.set_path(to.clone());
            self.items.insert(to.clone(), item);
            delta.renamed.push((from, to));
        }
        Ok(delta)
    }

    /// Delete an item and, for directories, its whole subtree.
    ///
    /// Deleting a missing path is a no-op.
    pub fn delete_item(&mut self, path: &VfsPath) -> Result<TreeDelta> {
        let Some(key) = self.resolve(path) else {
            return Ok(TreeDelta::default());
        };
        if key.is_root() {
            return Err(VfsError::InvalidPath("cannot delete the root".into()));
        }
        Ok(TreeDelta {
            removed: self.remove_subtree(&key),
            ..TreeDelta::default()
        })
    }

    /// Direct children of `dir`: directories first (the priority directory
    /// leading), then files, each sorted by name.
    pub fn list(&self, dir: &VfsPath) -> Result<Vec<&Item>> {
        let dir = dir.as_dir();
        if !self.items.contains_key(&dir) {
            return Err(VfsError::NotFound(dir.to_string()));
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for item in self.descendants(&dir) {
            let rest = &item.path().as_str()[dir.as_str().len()..];
            if rest.trim_end_matches('/').contains('/') {
                continue;
            }
            match item.kind() {
                ItemKind::Directory => dirs.push(item),
                ItemKind::File => files.push(item),
            }
        }

        let priority = self.priority_dir.as_ref();
        dirs.sort_by(|a, b| {
            let a_first = Some(a.path()) == priority;
            let b_first = Some(b.path()) == priority;
            b_first
                .cmp(&a_first)
                .then_with(|| a.path().file_name().cmp(b.path().file_name()))
        });
        files.sort_by(|a, b| a.path().file_name().cmp(b.path().file_name()));

        dirs.extend(files);
        Ok(dirs)
    }

    /// Every non-root item has a directory parent and no path exists as
    /// both a file and a directory.
    pub fn is_consistent(&self) -> bool {
        self.items.iter().all(|(key, item)| {
            if key != item.path() || (key.is_dir() != (item.kind() == ItemKind::Directory)) {
                return false;
            }
            if key.is_root() {
                return true;
            }
            let parent_ok = key
                .parent()
                .map(|parent| self.items.contains_key(&parent))
                .unwrap_or(false);
            let twin_absent = key.twin().is_none_or(|twin| !self.items.contains_key(&twin));
            parent_ok && twin_absent
        })
    }

    // ── Internal ──────────────────────────────────────────────────────────

    fn check_no_file_ancestor(&self, path: &VfsPath) -> Result<()> {
        for ancestor in path.ancestors() {
            if let Some(as_file) = ancestor.as_file() {
                if self.items.contains_key(&as_file) {
                    return Err(VfsError::AlreadyExists(as_file.to_string()));
                }
            }
        }
        Ok(())
    }

    fn create_missing_ancestors(&mut self, path: &VfsPath, delta: &mut TreeDelta) {
        for ancestor in path.ancestors() {
            if !self.items.contains_key(&ancestor) {
                self.items
                    .insert(ancestor.clone(), Item::Directory { path: ancestor.clone() });
                delta.created.push(ancestor);
            }
        }
    }

    fn remove_subtree(&mut self, key: &VfsPath) -> Vec<VfsPath> {
        let mut removed = vec![key.clone()];
        if key.is_dir() {
            removed.extend(self.descendants(key).map(|item| item.path().clone()));
        }
        for path in &removed {
            self.items.remove(path);
        }
        removed
    }
}
