//! Projection of a workspace onto compile inputs.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Result, VfsError};
use crate::framework::SourceLanguage;
use crate::path::{is_ancestor, VfsPath};
use crate::workspace::Workspace;

static RUST_DECLARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*(?:\w+::)*)declare_id!\(\s*"\w*"\s*\)"#).expect("valid regex")
});

static PYTHON_DECLARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)declare_id\(\s*'\w*'\s*\)").expect("valid regex")
});

/// A single compile input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFile {
    pub path: VfsPath,
    pub content: String,
}

/// Select the files to send to the build service.
///
/// Files come from the framework's source directory (every file for a
/// temporary workspace), filtered by extension. `overlay` supplies content
/// that is newer than the tree, such as unflushed edits. When the workspace
/// has a program id, the declared-identifier macro in the first matching
/// candidate (`lib.rs`, then `id.rs`, then path order) is rewritten; no
/// other file is touched. The tree itself is never modified.
pub fn build_files(
    workspace: &Workspace,
    overlay: &HashMap<VfsPath, String>,
) -> Result<Vec<BuildFile>> {
    let framework = workspace.framework();
    let source_dir = VfsPath::parse(framework.source_dir())?;
    let extensions = framework.source_extensions();

    let mut files: Vec<BuildFile> = workspace
        .tree()
        .files()
        .filter(|item| workspace.is_temporary() || is_ancestor(&source_dir, item.path()))
        .filter(|item| {
            item.path()
                .extension()
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .map(|item| BuildFile {
            path: item.path().clone(),
            content: overlay
                .get(item.path())
                .cloned()
                .unwrap_or_else(|| item.content().unwrap_or_default().to_string()),
        })
        .collect();

    if files.is_empty() {
        return Err(VfsError::NoSourceFiles);
    }

    if let Some(program_id) = workspace.program_id() {
        let (pattern, replacement) = match framework.language() {
            SourceLanguage::Rust => (&*RUST_DECLARE_ID, format!("${{1}}declare_id!(\"{program_id}\")")),
            SourceLanguage::Python => (&*PYTHON_DECLARE_ID, format!("${{1}}declare_id('{program_id}')")),
        };

        let mut candidates: Vec<usize> = (0..files.len()).collect();
        candidates.sort_by_key(|&i| (candidate_rank(&files[i].path), files[i].path.clone()));

        if let Some(&index) = candidates
            .iter()
            .find(|&&i| pattern.is_match(&files[i].content))
        {
            let file = &mut files[index];
            file.content = pattern
                .replacen(&file.content, 1, replacement.as_str())
                .into_owned();
            tracing::debug!("Injected program id into {}", file.path);
        }
    }

    Ok(files)
}

fn candidate_rank(path: &VfsPath) -> u8 {
    match path.file_name() {
        "lib.rs" => 0,
        "id.rs" => 1,
        _ => 2,
    }
}

/// Program ids are base58-style identifiers: ASCII alphanumerics only.
pub fn validate_program_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(VfsError::InvalidName(id.to_string()));
    }
    Ok(())
}
