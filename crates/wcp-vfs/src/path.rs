//! Virtual workspace paths.
//!
//! A [`VfsPath`] is always normalized and absolute within its workspace:
//!
//! ```text
//! /                 root directory
//! /src/             directory (trailing separator)
//! /src/lib.rs       file
//! ```
//!
//! All functions here are pure and total except for the documented failures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VfsError};

pub const SEPARATOR: char = '/';

const MAX_NAME_LEN: usize = 255;

/// A normalized path inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VfsPath(String);

impl VfsPath {
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Parse and normalize a user-supplied path.
    pub fn parse(input: &str) -> Result<Self> {
        normalize(input)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dir(&self) -> bool {
        self.0.ends_with(SEPARATOR)
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Last segment without the trailing separator. Empty for the root.
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches(SEPARATOR);
        trimmed.rsplit(SEPARATOR).next().unwrap_or("")
    }

    /// Extension of a file path, without the dot.
    pub fn extension(&self) -> Option<&str> {
        if self.is_dir() {
            return None;
        }
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    pub fn parent(&self) -> Result<Self> {
        parent_of(self)
    }

    pub fn join(&self, segment: &str, is_dir: bool) -> Result<Self> {
        join(self, segment, is_dir)
    }

    /// The directory form of this path (`/a` → `/a/`).
    pub fn as_dir(&self) -> Self {
        if self.is_dir() {
            self.clone()
        } else {
            Self(format!("{}{SEPARATOR}", self.0))
        }
    }

    /// The file form of this path (`/a/` → `/a`). `None` for the root.
    pub fn as_file(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else if self.is_dir() {
            Some(Self(self.0.trim_end_matches(SEPARATOR).to_string()))
        } else {
            Some(self.clone())
        }
    }

    /// The same location with the opposite kind (file ↔ directory).
    pub fn twin(&self) -> Option<Self> {
        if self.is_dir() {
            self.as_file()
        } else {
            Some(self.as_dir())
        }
    }

    /// Directory ancestors from the root down, excluding `self`.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.clone();
        while let Ok(parent) = current.parent() {
            out.push(parent.clone());
            current = parent;
        }
        out.reverse();
        out
    }

    /// Replace the directory prefix `from` with `to`.
    ///
    /// `self` must equal `from` or be a descendant of it.
    pub fn rebase(&self, from: &VfsPath, to: &VfsPath) -> Self {
        debug_assert!(from.is_dir() && to.is_dir());
        match self.0.strip_prefix(from.as_str()) {
            Some(rest) => Self(format!("{}{rest}", to.as_str())),
            None => self.clone(),
        }
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VfsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for VfsPath {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl TryFrom<String> for VfsPath {
    type Error = VfsError;

    fn try_from(value: String) -> Result<Self> {
        normalize(&value)
    }
}

impl From<VfsPath> for String {
    fn from(value: VfsPath) -> Self {
        value.0
    }
}

/// Normalize a path: collapse `.` and repeated separators, resolve `..`.
///
/// Relative input is taken relative to the workspace root. A trailing
/// separator, `.` or `..` as the final segment yields a directory path.
pub fn normalize(input: &str) -> Result<VfsPath> {
    if input.is_empty() {
        return Err(VfsError::InvalidPath("empty path".into()));
    }
    if input.contains('\0') {
        return Err(VfsError::InvalidPath(input.escape_default().to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut last_is_dir_marker = input.ends_with(SEPARATOR);
    for segment in input.split(SEPARATOR) {
        match segment {
            "" => {}
            "." => last_is_dir_marker = true,
            ".." => {
                if segments.pop().is_none() {
                    return Err(VfsError::InvalidPath(format!("{input} escapes the workspace root")));
                }
                last_is_dir_marker = true;
            }
            s => {
                segments.push(s);
                last_is_dir_marker = false;
            }
        }
    }
    let is_dir = last_is_dir_marker || input.ends_with(SEPARATOR);

    if segments.is_empty() {
        return Ok(VfsPath::root());
    }

    let mut out = String::with_capacity(input.len() + 2);
    for segment in &segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    if is_dir {
        out.push(SEPARATOR);
    }
    Ok(VfsPath(out))
}

/// Append `segment` to directory `base`. `segment` may itself contain separators.
pub fn join(base: &VfsPath, segment: &str, is_dir: bool) -> Result<VfsPath> {
    if !base.is_dir() {
        return Err(VfsError::InvalidPath(format!("{base} is not a directory")));
    }
    let segment = segment.trim_matches(SEPARATOR);
    if segment.is_empty() {
        return Ok(base.clone());
    }
    let joined = format!("{}{segment}", base.as_str());
    let path = normalize(&joined)?;
    if !path.as_str().starts_with(base.as_str()) {
        return Err(VfsError::InvalidPath(format!("{segment} escapes {base}")));
    }
    Ok(if is_dir { path.as_dir() } else { path.as_file().unwrap_or(path) })
}

/// The directory containing `path`.
pub fn parent_of(path: &VfsPath) -> Result<VfsPath> {
    if path.is_root() {
        return Err(VfsError::NoParent);
    }
    let trimmed = path.as_str().trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => Ok(VfsPath(trimmed[..=idx].to_string())),
        None => Ok(VfsPath::root()),
    }
}

/// `path` relative to directory `root`, without a leading separator.
pub fn relative_to(root: &VfsPath, path: &VfsPath) -> Result<String> {
    let root = root.as_dir();
    if path.as_dir() == root {
        return Ok(String::new());
    }
    path.as_str()
        .strip_prefix(root.as_str())
        .map(str::to_string)
        .ok_or_else(|| VfsError::InvalidPath(format!("{path} is not under {root}")))
}

/// True if `a` is a directory that strictly contains `b`.
pub fn is_ancestor(a: &VfsPath, b: &VfsPath) -> bool {
    a.is_dir() && a != b && b.as_str().starts_with(a.as_str())
}

/// Validate a single item name (one path segment).
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.len() > MAX_NAME_LEN
        || name.trim() != name
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}
