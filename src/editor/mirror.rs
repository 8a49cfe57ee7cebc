//! Writing the project tree into a real directory and mapping paths back.

use crate::error::ApiError;
use crate::tree::{FileNode, FileTree};
use std::fs;
use std::path::{Component, Path};
use tracing::debug;

/// Write every folder and file of `tree` under `dir`. Existing files with the
/// same path are overwritten; files the tree does not know are left alone.
/// Returns the number of files written.
pub fn mirror_tree(tree: &FileTree, dir: &Path) -> Result<usize, ApiError> {
    fs::create_dir_all(dir)?;
    let mut written = 0;
    for root in tree.roots() {
        written += mirror_node(root, dir)?;
    }
    debug!(dir = %dir.display(), files = written, "Mirrored project tree");
    Ok(written)
}

fn mirror_node(node: &FileNode, dir: &Path) -> Result<usize, ApiError> {
    let target = dir.join(&node.path);
    if node.is_folder() {
        fs::create_dir_all(&target)?;
        let mut written = 0;
        for child in &node.children {
            written += mirror_node(child, dir)?;
        }
        return Ok(written);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, node.text())?;
    Ok(1)
}

/// Tree path (`a/b/c.ts`) for a file under `dir`, or None outside it
pub fn tree_path(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?.to_string()),
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}
