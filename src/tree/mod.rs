//! Project tree
//!
//! The single root collection of [`FileNode`]s. Owns every node; parent links
//! are ids resolved by lookup, so nothing here forms an ownership cycle.

pub mod node;

pub use node::{validate_name, FileNode};

use crate::error::TreeError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered root collection of the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<FileNode>,
}

impl FileTree {
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    /// Build a tree from root nodes, validating structure and materializing
    /// paths and parent links.
    pub fn from_roots(roots: Vec<FileNode>) -> Result<Self, TreeError> {
        let mut tree = Self { roots };
        tree.validate()?;
        tree.rematerialize();
        Ok(tree)
    }

    pub fn roots(&self) -> &[FileNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        self.roots.iter_mut().find_map(|r| r.find_mut(id))
    }

    pub fn get_or_error(&self, id: NodeId) -> Result<&FileNode, TreeError> {
        self.get(id).ok_or(TreeError::NotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a node's parent through its back-reference
    pub fn parent_of(&self, id: NodeId) -> Option<&FileNode> {
        self.get(id)
            .and_then(|node| node.parent)
            .and_then(|parent_id| self.get(parent_id))
    }

    /// Look up a node by its materialized path. Leading and trailing `/` are ignored.
    pub fn find_by_path(&self, path: &str) -> Option<&FileNode> {
        let wanted = path.trim_matches('/');
        if wanted.is_empty() {
            return None;
        }
        let mut segments = wanted.split('/');
        let first = segments.next()?;
        let mut current = self.roots.iter().find(|n| n.name == first)?;
        for segment in segments {
            current = current.children.iter().find(|n| n.name == segment)?;
        }
        Some(current)
    }

    pub fn find_by_path_or_error(&self, path: &str) -> Result<&FileNode, TreeError> {
        self.find_by_path(path)
            .ok_or_else(|| TreeError::PathNotFound(path.to_string()))
    }

    /// Depth-first list of every file; folders are excluded
    pub fn files(&self) -> Vec<&FileNode> {
        fn collect<'a>(nodes: &'a [FileNode], out: &mut Vec<&'a FileNode>) {
            for node in nodes {
                if node.is_file() {
                    out.push(node);
                }
                collect(&node.children, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.roots, &mut out);
        out
    }

    /// Total number of nodes, folders included
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[FileNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }

    /// Append a node to the root collection
    pub fn push_root(&mut self, mut node: FileNode) -> Result<NodeId, TreeError> {
        validate_name(&node.name)?;
        node.rematerialize(None);
        let id = node.id;
        self.roots.push(node);
        Ok(id)
    }

    /// Append `node` as the last child of the folder `parent`
    pub fn insert_child(&mut self, parent: NodeId, mut node: FileNode) -> Result<NodeId, TreeError> {
        validate_name(&node.name)?;
        let folder = self.get_mut(parent).ok_or(TreeError::NotFound(parent))?;
        if !folder.is_folder() {
            return Err(TreeError::NotAFolder(parent));
        }
        node.rematerialize(Some((folder.id, &folder.path)));
        let id = node.id;
        folder.children.push(node);
        Ok(id)
    }

    /// Detach a node from its parent's children by id and return it.
    /// Root-level nodes are not removable.
    pub fn remove(&mut self, id: NodeId) -> Result<FileNode, TreeError> {
        let node = self.get(id).ok_or(TreeError::NotFound(id))?;
        let parent_id = node.parent.ok_or(TreeError::RootNotDeletable(id))?;
        let parent = self
            .get_mut(parent_id)
            .ok_or(TreeError::NotFound(parent_id))?;
        let index = parent
            .children
            .iter()
            .position(|c| c.id == id)
            .ok_or(TreeError::NotFound(id))?;
        Ok(parent.children.remove(index))
    }

    /// Rename a node and rewrite the path of it and every descendant.
    /// Returns the old path.
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<String, TreeError> {
        validate_name(new_name)?;
        let node = self.get_mut(id).ok_or(TreeError::NotFound(id))?;
        let old_path = node.path.clone();
        let new_path = match old_path.rsplit_once('/') {
            Some((parent_path, _)) => format!("{}/{}", parent_path, new_name),
            None => new_name.to_string(),
        };
        node.name = new_name.to_string();
        node.replace_path_prefix(&old_path, &new_path);
        Ok(old_path)
    }

    /// Check structural well-formedness: unique ids, valid names,
    /// files without children, folders without content.
    pub fn validate(&self) -> Result<(), TreeError> {
        fn walk(nodes: &[FileNode], seen: &mut HashSet<NodeId>) -> Result<(), TreeError> {
            for node in nodes {
                validate_name(&node.name)?;
                if !seen.insert(node.id) {
                    return Err(TreeError::DuplicateId(node.id));
                }
                if node.is_file() && !node.children.is_empty() {
                    return Err(TreeError::InvalidStructure(format!(
                        "file '{}' has children",
                        node.name
                    )));
                }
                if node.is_folder() && node.content.is_some() {
                    return Err(TreeError::InvalidStructure(format!(
                        "folder '{}' has content",
                        node.name
                    )));
                }
                walk(&node.children, seen)?;
            }
            Ok(())
        }
        walk(&self.roots, &mut HashSet::new())
    }

    /// Recompute every path and parent link from structure
    pub fn rematerialize(&mut self) {
        for root in &mut self.roots {
            root.rematerialize(None);
        }
    }
}
