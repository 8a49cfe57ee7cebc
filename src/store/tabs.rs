//! Open-tab and selection state of the editor

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Open files in open order, plus the active tab and the explorer selection.
///
/// `active`, when set, is always a member of `open`. `selected` mirrors `active`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabState {
    open: Vec<NodeId>,
    active: Option<NodeId>,
    selected: Option<NodeId>,
}

impl TabState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tabs(&self) -> &[NodeId] {
        &self.open
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_open(&self, id: NodeId) -> bool {
        self.open.contains(&id)
    }

    /// Activate `id`, appending it to the open list if it is not there yet
    pub fn open(&mut self, id: NodeId) {
        if !self.is_open(id) {
            self.open.push(id);
        }
        self.active = Some(id);
        self.selected = Some(id);
    }

    /// Remove `id` from the open list. Returns false if it was not open.
    ///
    /// Closing the active tab promotes the new last tab, or clears activation.
    pub fn close(&mut self, id: NodeId) -> bool {
        let Some(index) = self.open.iter().position(|t| *t == id) else {
            return false;
        };
        self.open.remove(index);
        if self.active == Some(id) {
            self.active = self.open.last().copied();
            self.selected = self.active;
        }
        true
    }

    /// Set active and selected without touching the open list.
    /// Returns false (and changes nothing) if `id` is not open.
    pub fn activate(&mut self, id: NodeId) -> bool {
        if !self.is_open(id) {
            return false;
        }
        self.active = Some(id);
        self.selected = Some(id);
        true
    }

    /// Drop tabs whose ids fail `keep`, then repair activation
    pub fn retain(&mut self, keep: impl Fn(NodeId) -> bool) {
        let closing: Vec<NodeId> = self.open.iter().copied().filter(|id| !keep(*id)).collect();
        for id in closing {
            self.close(id);
        }
        self.repair();
    }

    /// Deserialized state may name an active tab that is not open
    fn repair(&mut self) {
        if self.active.map_or(true, |id| !self.is_open(id)) {
            self.active = self.open.last().copied();
        }
        self.selected = self.active;
    }
}
