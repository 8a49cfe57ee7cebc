//! Error types for tree, store, preview and CLI operations.
//!
//! Compile failures are not errors: the compiler reports them as
//! [`crate::compiler::CompileOutcome::Failure`] values.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised by tree and tab-state operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Node {0} is not a folder")]
    NotAFolder(NodeId),

    #[error("Node {0} is not a file")]
    NotAFile(NodeId),

    #[error("Root-level node {0} cannot be deleted")]
    RootNotDeletable(NodeId),

    #[error("Invalid node name: {0:?}")]
    InvalidName(String),

    #[error("Duplicate node id in tree: {0}")]
    DuplicateId(NodeId),

    #[error("File {0} is not open in a tab")]
    NotOpen(NodeId),

    #[error("No node at path: {0}")]
    PathNotFound(String),

    #[error("Invalid tree structure: {0}")]
    InvalidStructure(String),
}

/// Top-level error type surfaced to library callers and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Tree error: {0}")]
    TreeError(#[from] TreeError),

    #[error("Import failed: {0}")]
    ImportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Preview error: {0}")]
    PreviewError(String),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("No project session at {0}; run `playpen init` first")]
    NotInitialized(std::path::PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
