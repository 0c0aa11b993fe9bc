//! Open tabs and per-file editor positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::VfsPath;

/// Cursor range and scroll offset restored when a file is reopened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub cursor_from: u64,
    pub cursor_to: u64,
    pub top_line: u64,
}

/// Ordered tab list with a focused index.
///
/// Only file paths that exist in the owning workspace's tree are kept here;
/// the workspace enforces that on every tree mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabState {
    tabs: Vec<VfsPath>,
    current: Option<usize>,
    #[serde(default)]
    positions: HashMap<VfsPath, Position>,
}

impl TabState {
    pub fn tabs(&self) -> &[VfsPath] {
        &self.tabs
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&VfsPath> {
        self.current.and_then(|i| self.tabs.get(i))
    }

    pub fn is_open(&self, path: &VfsPath) -> bool {
        self.tabs.contains(path)
    }

    pub fn position(&self, path: &VfsPath) -> Option<Position> {
        self.positions.get(path).copied()
    }

    /// Add the tab if missing and focus it.
    pub fn open(&mut self, path: &VfsPath) {
        let index = match self.tabs.iter().position(|p| p == path) {
            Some(index) => index,
            None => {
                self.tabs.push(path.clone());
                self.tabs.len() - 1
            }
        };
        self.current = Some(index);
    }

    /// Focus an open tab. Returns false if it is not open.
    pub fn focus(&mut self, path: &VfsPath) -> bool {
        match self.tabs.iter().position(|p| p == path) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Remove a tab. When it was focused, focus moves to its left
    /// neighbour, or to the new first tab, or nowhere.
    ///
    /// Returns false if the tab was not open.
    pub fn close(&mut self, path: &VfsPath) -> bool {
        let Some(index) = self.tabs.iter().position(|p| p == path) else {
            return false;
        };
        self.tabs.remove(index);
        self.positions.remove(path);

        self.current = match self.current {
            _ if self.tabs.is_empty() => None,
            Some(current) if current == index => Some(index.saturating_sub(1)),
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        true
    }

    /// Store a position for an open file; ignored for files not open.
    pub fn save_position(&mut self, path: &VfsPath, position: Position) {
        if self.is_open(path) {
            self.positions.insert(path.clone(), position);
        }
    }

    /// Follow a renamed path. If `to` is already open the `from` tab merges
    /// into it, keeping focus on the merged tab when `from` had it.
    pub fn rename(&mut self, from: &VfsPath, to: &VfsPath) {
        if let Some(index) = self.tabs.iter().position(|p| p == from) {
            match self.tabs.iter().position(|p| p == to) {
                Some(existing) => {
                    self.tabs.remove(index);
                    let existing = if existing > index { existing - 1 } else { existing };
                    self.current = match self.current {
                        Some(current) if current == index => Some(existing),
                        Some(current) if current > index => Some(current - 1),
                        other => other,
                    };
                }
                None => self.tabs[index] = to.clone(),
            }
        }
        if let Some(position) = self.positions.remove(from) {
            self.positions.insert(to.clone(), position);
        }
    }

    /// Drop tabs and positions whose paths no longer hold files.
    pub fn retain(&mut self, mut keep: impl FnMut(&VfsPath) -> bool) {
        let stale: Vec<VfsPath> = self.tabs.iter().filter(|p| !keep(p)).cloned().collect();
        for path in &stale {
            self.close(path);
        }
        self.positions.retain(|path, _| keep(path));
    }
}
