//! File and folder node representation

use crate::error::TreeError;
use crate::types::{language_for_name, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// One file or folder in the project tree.
///
/// `parent` is a non-owning back-reference resolved by lookup. It is not part
/// of the interchange format and is rebuilt whenever a tree is imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub children: Vec<FileNode>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub path: String,
    #[serde(skip)]
    pub parent: Option<NodeId>,
}

impl FileNode {
    /// New empty file. `language` falls back to extension inference.
    pub fn file(name: &str, language: Option<&str>) -> Self {
        let language = language
            .map(str::to_string)
            .unwrap_or_else(|| language_for_name(name).to_string());
        Self {
            id: NodeId::new(),
            name: name.to_string(),
            kind: NodeKind::File,
            content: Some(String::new()),
            language: Some(language),
            children: Vec::new(),
            expanded: false,
            path: name.to_string(),
            parent: None,
        }
    }

    /// New empty, collapsed folder
    pub fn folder(name: &str) -> Self {
        Self {
            id: NodeId::new(),
            name: name.to_string(),
            kind: NodeKind::Folder,
            content: None,
            language: None,
            children: Vec::new(),
            expanded: false,
            path: name.to_string(),
            parent: None,
        }
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<FileNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// File content, empty for folders
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Find a node by id in this subtree (depth-first, self included)
    pub fn find(&self, id: NodeId) -> Option<&FileNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Ids of this node and every descendant
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id];
        for child in &self.children {
            ids.extend(child.subtree_ids());
        }
        ids
    }

    /// Recompute `path` and `parent` for this node's subtree from the given
    /// parent path. Root nodes pass `None`.
    pub(crate) fn rematerialize(&mut self, parent: Option<(NodeId, &str)>) {
        match parent {
            Some((parent_id, parent_path)) => {
                self.path = format!("{}/{}", parent_path, self.name);
                self.parent = Some(parent_id);
            }
            None => {
                self.path = self.name.clone();
                self.parent = None;
            }
        }
        let id = self.id;
        let path = self.path.clone();
        for child in &mut self.children {
            child.rematerialize(Some((id, &path)));
        }
    }

    /// Replace the `old` path prefix with `new` across this subtree
    pub(crate) fn replace_path_prefix(&mut self, old: &str, new: &str) {
        if let Some(rest) = self.path.strip_prefix(old) {
            self.path = format!("{}{}", new, rest);
        }
        for child in &mut self.children {
            child.replace_path_prefix(old, new);
        }
    }
}

/// Validate a node name: non-empty, no path separators, not `.` or `..`
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_defaults() {
        let node = FileNode::file("main.ts", None);
        assert!(node.is_file());
        assert_eq!(node.language.as_deref(), Some("typescript"));
        assert_eq!(node.text(), "");
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_folder_is_collapsed() {
        let node = FileNode::folder("src");
        assert!(node.is_folder());
        assert!(!node.expanded);
        assert!(node.content.is_none());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("app.ts").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(" padded").is_err());
    }

    #[test]
    fn test_rematerialize_sets_paths_and_parents() {
        let mut root = FileNode::folder("src").with_children(vec![FileNode::folder("app")
            .with_children(vec![FileNode::file("app.component.ts", None)])]);
        root.rematerialize(None);
        let app = &root.children[0];
        assert_eq!(app.path, "src/app");
        assert_eq!(app.parent, Some(root.id));
        assert_eq!(app.children[0].path, "src/app/app.component.ts");
        assert_eq!(app.children[0].parent, Some(app.id));
    }

    #[test]
    fn test_serialized_form_omits_parent() {
        let mut root = FileNode::folder("src").with_children(vec![FileNode::file("a.ts", None)]);
        root.rematerialize(None);
        let json = serde_json::to_value(&root).unwrap();
        assert!(json.get("parent").is_none());
        assert_eq!(json["children"][0]["path"], "src/a.ts");
        assert_eq!(json["kind"], "folder");
    }
}
