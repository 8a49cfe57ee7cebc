//! StorageConfig and the resolved on-disk locations of a workspace.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage configuration
///
/// Unset paths live under the workspace data directory. Relative paths are
/// resolved against the workspace root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the workspace data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Session file holding the project tree and tab state
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

/// Every location a workspace reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub data_dir: PathBuf,
    pub session_file: PathBuf,
    pub compile_log: PathBuf,
    pub preview_dir: PathBuf,
}

impl StorageConfig {
    /// Resolve storage paths to actual filesystem locations.
    pub fn resolve_paths(
        &self,
        workspace_root: &Path,
        preview_dir: Option<&Path>,
    ) -> Result<WorkspacePaths, ApiError> {
        let data_dir = match &self.data_dir {
            Some(dir) => workspace_root.join(dir),
            None => xdg::workspace_data_dir(workspace_root)?,
        };
        let session_file = match &self.session_file {
            Some(file) => workspace_root.join(file),
            None => data_dir.join("session.json"),
        };
        let preview_dir = match preview_dir {
            Some(dir) => workspace_root.join(dir),
            None => data_dir.join("preview"),
        };

        Ok(WorkspacePaths {
            compile_log: data_dir.join("compile.log"),
            data_dir,
            session_file,
            preview_dir,
        })
    }
}
