//! A named project: one tree, its tabs, and build metadata.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VfsError};
use crate::framework::{Framework, SeedFile};
use crate::path::VfsPath;
use crate::tabs::TabState;
use crate::tree::{CreateOptions, FileTree, RenameOptions, TreeDelta};

pub const MAX_WORKSPACE_NAME_LEN: usize = 32;

/// Name reported for the temporary workspace. It can never be registered.
pub const SCRATCH_NAME: &str = "(scratch)";

/// Workspace names: non-empty, no surrounding whitespace, no separators,
/// at most [`MAX_WORKSPACE_NAME_LEN`] characters.
pub fn validate_workspace_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.trim() != name
        || name.chars().count() > MAX_WORKSPACE_NAME_LEN
        || name.contains(['/', '\\', '\0'])
        || name == SCRATCH_NAME;
    if invalid {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Everything about a workspace except its items, as stored under `meta/<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMeta {
    pub framework: Framework,
    #[serde(default)]
    pub tabs: TabState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,
    framework: Framework,
    tree: FileTree,
    tabs: TabState,
    program_id: Option<String>,
    temporary: bool,
}

impl Workspace {
    pub fn new(name: impl Into<String>, framework: Framework) -> Self {
        Self {
            name: name.into(),
            framework,
            tree: Self::empty_tree(framework),
            tabs: TabState::default(),
            program_id: None,
            temporary: false,
        }
    }

    /// A workspace that is never written to the store.
    pub fn scratch(framework: Framework) -> Self {
        Self {
            temporary: true,
            ..Self::new(SCRATCH_NAME, framework)
        }
    }

    pub(crate) fn from_parts(name: String, meta: WorkspaceMeta, tree: FileTree) -> Self {
        let mut workspace = Self {
            name,
            framework: meta.framework,
            tree,
            tabs: meta.tabs,
            program_id: meta.program_id,
            temporary: false,
        };
        workspace.prune_tabs();
        workspace
    }

    pub(crate) fn empty_tree(framework: Framework) -> FileTree {
        match VfsPath::parse(framework.source_dir()) {
            Ok(dir) => FileTree::with_priority_dir(dir),
            Err(_) => FileTree::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn tabs(&self) -> &TabState {
        &self.tabs
    }

    pub fn program_id(&self) -> Option<&str> {
        self.program_id.as_deref()
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn meta(&self) -> WorkspaceMeta {
        WorkspaceMeta {
            framework: self.framework,
            tabs: self.tabs.clone(),
            program_id: self.program_id.clone(),
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_program_id(&mut self, id: Option<String>) {
        self.program_id = id;
    }

    pub(crate) fn tabs_mut(&mut self) -> &mut TabState {
        &mut self.tabs
    }

    /// Populate the tree from seed files. Every path is checked before the
    /// tree is touched.
    pub(crate) fn seed(&mut self, files: &[SeedFile]) -> Result<()> {
        let parsed = files
            .iter()
            .map(|file| {
                let path = VfsPath::parse(&file.path)?;
                if path.is_dir() {
                    return Err(VfsError::InvalidPath(file.path.clone()));
                }
                Ok((path, file.content.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tree = self.tree.clone();
        for (path, content) in parsed {
            tree.create_item(
                &path,
                Some(content),
                CreateOptions {
                    allow_overwrite: true,
                    temporary_buffer: false,
                },
            )?;
        }
        self.tree = tree;
        Ok(())
    }

    pub(crate) fn create_item(
        &mut self,
        path: &VfsPath,
        content: Option<String>,
        opts: CreateOptions,
    ) -> Result<TreeDelta> {
        let delta = self.tree.create_item(path, content, opts)?;
        self.reconcile_tabs(&delta);
        Ok(delta)
    }

    pub(crate) fn rename_item(
        &mut self,
        old: &VfsPath,
        new: &VfsPath,
        opts: RenameOptions,
    ) -> Result<TreeDelta> {
        let delta = self.tree.rename_item(old, new, opts)?;
        self.reconcile_tabs(&delta);
        Ok(delta)
    }

    pub(crate) fn delete_item(&mut self, path: &VfsPath) -> Result<TreeDelta> {
        let delta = self.tree.delete_item(path)?;
        self.reconcile_tabs(&delta);
        Ok(delta)
    }

    pub(crate) fn update_content(&mut self, path: &VfsPath, content: String) -> Result<TreeDelta> {
        self.tree.update_content(path, content)
    }

    /// Tabs follow renamed files and disappear with removed ones.
    fn reconcile_tabs(&mut self, delta: &TreeDelta) {
        for (from, to) in &delta.renamed {
            if !from.is_dir() {
                self.tabs.rename(from, to);
            }
        }
        if !delta.removed.is_empty() {
            self.prune_tabs();
        }
    }

    fn prune_tabs(&mut self) {
        let tree = &self.tree;
        self.tabs
            .retain(|path| tree.file_content(path).is_some());
    }
}
