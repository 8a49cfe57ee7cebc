//! Project Store
//!
//! Single source of truth for the playground's file tree and the editor's
//! open-tab state. Mutations are synchronous; each one bumps the revision and
//! notifies subscribers.

pub mod observer;
pub mod persistence;
pub mod scaffold;
pub mod tabs;

pub use observer::{Observers, StoreEvent, SubscriptionId};
pub use tabs::TabState;

use crate::error::{ApiError, TreeError};
use crate::tree::{FileNode, FileTree};
use crate::types::NodeId;
use tracing::{debug, info, warn};

/// Project tree plus tab state and change subscribers
#[derive(Debug, Default)]
pub struct ProjectStore {
    tree: FileTree,
    tabs: TabState,
    revision: u64,
    observers: Observers,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store over an existing tree, with no open tabs
    pub fn with_tree(tree: FileTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn tabs(&self) -> &TabState {
        &self.tabs
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// The file in the active tab
    pub fn active_file(&self) -> Option<&FileNode> {
        self.tabs.active().and_then(|id| self.tree.get(id))
    }

    /// Files in open order
    pub fn open_files(&self) -> Vec<&FileNode> {
        self.tabs
            .open_tabs()
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .collect()
    }

    /// Append an empty file as the last child of `parent`.
    ///
    /// If `parent` is not a folder the tree is left untouched.
    pub fn create_file(
        &mut self,
        parent: NodeId,
        name: &str,
        language_hint: Option<&str>,
    ) -> Result<NodeId, TreeError> {
        let id = self
            .tree
            .insert_child(parent, FileNode::file(name, language_hint))?;
        debug!(parent = %parent, name, "Created file");
        self.emit_tree_changed();
        Ok(id)
    }

    /// Append an empty, collapsed folder as the last child of `parent`
    pub fn create_folder(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        let id = self.tree.insert_child(parent, FileNode::folder(name))?;
        debug!(parent = %parent, name, "Created folder");
        self.emit_tree_changed();
        Ok(id)
    }

    pub fn create_root_folder(&mut self, name: &str) -> Result<NodeId, TreeError> {
        let id = self.tree.push_root(FileNode::folder(name))?;
        self.emit_tree_changed();
        Ok(id)
    }

    pub fn create_root_file(
        &mut self,
        name: &str,
        language_hint: Option<&str>,
    ) -> Result<NodeId, TreeError> {
        let id = self.tree.push_root(FileNode::file(name, language_hint))?;
        self.emit_tree_changed();
        Ok(id)
    }

    /// Remove a node from its parent. Tabs for the node and any descendant
    /// are closed through the normal close protocol.
    pub fn delete_node(&mut self, id: NodeId) -> Result<FileNode, TreeError> {
        let removed = self.tree.remove(id)?;
        let gone = removed.subtree_ids();
        let tabs_before = self.tabs.clone();
        self.tabs.retain(|tab| !gone.contains(&tab));
        debug!(node = %id, path = %removed.path, "Deleted node");
        self.emit_tree_changed();
        if self.tabs != tabs_before {
            self.emit_tabs_changed();
        }
        Ok(removed)
    }

    /// Rename a node, rewriting the paths of it and its descendants
    pub fn rename_node(&mut self, id: NodeId, new_name: &str) -> Result<(), TreeError> {
        let old_path = self.tree.rename(id, new_name)?;
        debug!(node = %id, old_path = %old_path, new_name, "Renamed node");
        self.emit_tree_changed();
        Ok(())
    }

    /// Flip a folder's expansion flag. No-op on files.
    pub fn toggle_folder(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.tree.get_mut(id).ok_or(TreeError::NotFound(id))?;
        if !node.is_folder() {
            return Ok(());
        }
        node.expanded = !node.expanded;
        self.emit_tree_changed();
        Ok(())
    }

    /// Make `id` the current file and active tab, opening it if needed.
    /// No-op on folders.
    pub fn select_file(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = self.tree.get_or_error(id)?;
        if !node.is_file() {
            return Ok(());
        }
        self.tabs.open(id);
        self.emit_tabs_changed();
        Ok(())
    }

    /// Overwrite a file's content. Tabs and selection are untouched.
    pub fn update_file_content(&mut self, id: NodeId, content: &str) -> Result<(), TreeError> {
        let node = self.tree.get_mut(id).ok_or(TreeError::NotFound(id))?;
        if !node.is_file() {
            return Err(TreeError::NotAFile(id));
        }
        node.content = Some(content.to_string());
        self.revision += 1;
        let event = StoreEvent::ContentChanged {
            revision: self.revision,
            file: id,
        };
        self.observers.notify(&event);
        Ok(())
    }

    /// Close a tab. Returns false if the file was not open.
    pub fn close_tab(&mut self, id: NodeId) -> bool {
        let closed = self.tabs.close(id);
        if closed {
            self.emit_tabs_changed();
        }
        closed
    }

    /// Activate an already-open tab
    pub fn set_active_tab(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.tabs.activate(id) {
            return Err(TreeError::NotOpen(id));
        }
        self.emit_tabs_changed();
        Ok(())
    }

    /// Depth-first list of every file in the project
    pub fn get_all_files(&self) -> Vec<&FileNode> {
        self.tree.files()
    }

    /// Serialize the whole tree to the JSON interchange form
    pub fn export_project(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string_pretty(&self.tree)?)
    }

    /// Replace the tree from its JSON interchange form and clear all tab state.
    ///
    /// On malformed input the current tree and tabs stay as they were.
    pub fn import_project(&mut self, serialized: &str) -> Result<(), ApiError> {
        let tree = match parse_project(serialized) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "Project import rejected; keeping current tree");
                return Err(e);
            }
        };
        info!(nodes = tree.node_count(), "Imported project");
        self.replace(tree, TabState::new());
        Ok(())
    }

    /// Replace tree and tabs wholesale. Tabs that do not name a file in the
    /// new tree are dropped.
    pub fn replace(&mut self, tree: FileTree, mut tabs: TabState) {
        tabs.retain(|id| tree.get(id).map(|n| n.is_file()).unwrap_or(false));
        self.tree = tree;
        self.tabs = tabs;
        self.revision += 1;
        let event = StoreEvent::ProjectReplaced {
            revision: self.revision,
        };
        self.observers.notify(&event);
    }

    fn emit_tree_changed(&mut self) {
        self.revision += 1;
        let event = StoreEvent::TreeChanged {
            revision: self.revision,
        };
        self.observers.notify(&event);
    }

    fn emit_tabs_changed(&mut self) {
        self.revision += 1;
        let event = StoreEvent::TabsChanged {
            revision: self.revision,
        };
        self.observers.notify(&event);
    }
}

/// Parse and validate the JSON interchange form of a project
pub fn parse_project(serialized: &str) -> Result<FileTree, ApiError> {
    let roots: Vec<FileNode> = serde_json::from_str(serialized)
        .map_err(|e| ApiError::ImportError(format!("not a valid project tree: {}", e)))?;
    FileTree::from_roots(roots).map_err(|e| ApiError::ImportError(e.to_string()))
}
