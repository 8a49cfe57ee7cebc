//! MergeService: orchestrates sources and deserializes to PlaypenConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::PlaypenConfig;
use config::{Config, ConfigError, File, FileFormat};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from workspace and standard sources.
    /// Precedence: global file (lowest) -> workspace file -> environment (highest).
    /// Section defaults come from the serde defaults on each config struct.
    pub fn load(workspace_root: &Path) -> Result<PlaypenConfig, ConfigError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<PlaypenConfig, ConfigError> {
        let builder = Config::builder().add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Toml)
                .required(true),
        );
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
