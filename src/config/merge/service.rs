//! MergeService: orchestrates sources, applies merge policy, deserializes to VaultSortConfig.

use crate::config::sources::{environment, global_file, vault_file};
use crate::config::VaultSortConfig;
use config::ConfigError;
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config for a vault from the standard sources.
    /// Precedence: defaults (lowest) -> global file -> vault file -> environment (highest).
    pub fn load(vault_root: &Path) -> Result<VaultSortConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = vault_file::add_to_builder(builder, vault_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<VaultSortConfig, ConfigError> {
        use config::File;

        let builder = policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
