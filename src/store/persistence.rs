//! Session persistence: tree plus tab state saved between CLI invocations.

use super::{ProjectStore, TabState};
use crate::error::ApiError;
use crate::tree::{FileNode, FileTree};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const SESSION_VERSION: u32 = 1;

/// On-disk session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub project: Vec<FileNode>,
    #[serde(default)]
    pub tabs: TabState,
}

impl SessionSnapshot {
    pub fn capture(store: &ProjectStore) -> Self {
        Self {
            version: SESSION_VERSION,
            project: store.tree().roots().to_vec(),
            tabs: store.tabs().clone(),
        }
    }
}

/// Write the store's session to `path` atomically (temp file, then rename)
pub fn save_session(store: &ProjectStore, path: &Path) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let snapshot = SessionSnapshot::capture(store);
    let json = serde_json::to_string_pretty(&snapshot)?;
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, json)?;
    std::fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), revision = store.revision(), "Saved session");
    Ok(())
}

/// Load a session into a fresh store. Returns `Ok(None)` when no session exists.
pub fn load_session(path: &Path) -> Result<Option<ProjectStore>, ApiError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let snapshot: SessionSnapshot = serde_json::from_str(&text).map_err(|e| {
        ApiError::ImportError(format!("session file {} is corrupt: {}", path.display(), e))
    })?;
    if snapshot.version != SESSION_VERSION {
        return Err(ApiError::ImportError(format!(
            "unsupported session version {} (expected {})",
            snapshot.version, SESSION_VERSION
        )));
    }
    let tree = FileTree::from_roots(snapshot.project)
        .map_err(|e| ApiError::ImportError(e.to_string()))?;
    let mut store = ProjectStore::new();
    store.replace(tree, snapshot.tabs);
    Ok(Some(store))
}
