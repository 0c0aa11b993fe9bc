//! Error types for workspace and tree operations.

use crate::store::StoreError;

/// Errors returned by path, tree, tab, registry, and build operations.
///
/// Every operation either succeeds or fails with one of these kinds without
/// leaving the tree partially mutated.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("workspace name already registered: {0}")]
    DuplicateName(String),

    #[error("root has no parent")]
    NoParent,

    #[error("cannot delete the active workspace: {0}")]
    CannotDeleteCurrent(String),

    #[error("no source files to build")]
    NoSourceFiles,

    #[error("no active workspace")]
    NoActiveWorkspace,

    /// Only surfaced while loading state at startup; later store failures
    /// are downgraded to [`PersistWarning`](crate::registry::PersistWarning)s.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl VfsError {
    /// Stable kind label used in logs and protocol error data.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "InvalidPath",
            Self::InvalidName(_) => "InvalidName",
            Self::AlreadyExists(_) => "AlreadyExists",
            Self::NotFound(_) => "NotFound",
            Self::DuplicateName(_) => "DuplicateName",
            Self::NoParent => "NoParent",
            Self::CannotDeleteCurrent(_) => "CannotDeleteCurrent",
            Self::NoSourceFiles => "NoSourceFiles",
            Self::NoActiveWorkspace => "NoActiveWorkspace",
            Self::Store(_) => "Store",
        }
    }
}

pub type Result<T> = core::result::Result<T, VfsError>;
