//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, then the global file
//! (`$XDG_CONFIG_HOME/playpen/config.toml`), then the workspace file
//! (`<workspace>/playpen.toml`), then `PLAYPEN__SECTION__KEY` environment
//! variables.

pub mod facade;
pub mod merge {
    pub mod service;
}
pub mod sources {
    pub mod environment;
    pub mod global_file;
    pub mod workspace_file;
}
pub mod paths {
    pub mod xdg_root;
}
pub mod workspace {
    pub mod storage_paths;
}

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::{StorageConfig, WorkspacePaths};

use crate::compiler::CompilerConfig;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::preview::PreviewConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaypenConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl PlaypenConfig {
    /// Reject values that deserialize but cannot be used
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.compiler.entry_file.trim_matches('/').is_empty() {
            return Err(ApiError::ConfigError(
                "compiler.entry_file must not be empty".to_string(),
            ));
        }
        if self.compiler.component_marker.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "compiler.component_marker must not be empty".to_string(),
            ));
        }
        if let Some(cmd) = &self.preview.open_command {
            if cmd.trim().is_empty() {
                return Err(ApiError::ConfigError(
                    "preview.open_command must not be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Resolve the on-disk locations this workspace uses
    pub fn workspace_paths(&self, workspace_root: &Path) -> Result<WorkspacePaths, ApiError> {
        self.storage
            .resolve_paths(workspace_root, self.preview.output_dir.as_deref())
    }
}
