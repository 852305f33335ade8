//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::VaultSortConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a vault from files and environment.
    pub fn load(vault_root: &Path) -> Result<VaultSortConfig, ConfigError> {
        MergeService::load(vault_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<VaultSortConfig, ConfigError> {
        MergeService::load_from_file(path)
    }
}
