//! XDG Base Directory utilities for workspace data management.

use crate::error::ApiError;
use std::path::{Component, Path, PathBuf};

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data_home.is_empty() {
            return Some(PathBuf::from(xdg_data_home));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/playpen/config.toml`
pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join("playpen").join("config.toml"))
}

/// Append the normal components of `path` to `base`, dropping the root
pub(crate) fn nest_path(base: PathBuf, path: &Path) -> PathBuf {
    path.components().fold(base, |acc, component| match component {
        Component::Normal(name) => acc.join(name),
        Component::RootDir | Component::Prefix(_) | Component::CurDir | Component::ParentDir => {
            acc
        }
    })
}

/// Get the data directory for a specific workspace
///
/// Returns `$XDG_DATA_HOME/playpen/<workspace_path>/`. The canonical workspace
/// path is used as a directory structure, so `/home/user/demo` becomes
/// `$XDG_DATA_HOME/playpen/home/user/demo/` and nothing is written into the
/// workspace itself.
pub fn workspace_data_dir(workspace_root: &Path) -> Result<PathBuf, ApiError> {
    let data_home = data_home().ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;

    let canonical = workspace_root.canonicalize().map_err(|e| {
        ApiError::ConfigError(format!("Failed to canonicalize workspace path: {}", e))
    })?;

    Ok(nest_path(data_home.join("playpen"), &canonical))
}
