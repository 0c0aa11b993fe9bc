//! WCP core: the in-memory workspace model behind the playground.
//!
//! A [`WorkspaceRegistry`] owns named workspaces, each holding a [`FileTree`]
//! and [`TabState`]. Every mutation is mirrored to a [`Store`] and announced
//! on the [`EventBus`]. Nothing here is async; callers serialize access.

pub mod autosave;
pub mod build;
pub mod bus;
pub mod error;
pub mod framework;
pub mod path;
pub mod registry;
pub mod store;
pub mod tabs;
pub mod tree;
pub mod workspace;

pub use autosave::{AutoSave, DEFAULT_DEBOUNCE};
pub use build::{build_files, BuildFile};
pub use bus::{EventBus, EventKind, Subscription, VfsEvent};
pub use error::{Result, VfsError};
pub use framework::{Framework, SeedFile, SourceLanguage};
pub use path::VfsPath;
pub use registry::{PersistWarning, RegistryConfig, WorkspaceRegistry};
pub use store::{MemoryStore, SqliteStore, Store, StoreError};
pub use tabs::{Position, TabState};
pub use tree::{CreateOptions, FileTree, Item, ItemKind, RenameOptions, TreeDelta};
pub use workspace::{validate_workspace_name, Workspace, WorkspaceMeta, SCRATCH_NAME};
