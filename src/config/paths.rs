//! Platform locations for config and state files.

use std::path::{Path, PathBuf};

/// File name of the vault-local configuration.
pub const VAULT_CONFIG_FILE: &str = ".vaultsort.toml";

pub(crate) fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "vaultsort", "vaultsort")
}

/// Global configuration file, e.g. `~/.config/vaultsort/config.toml` on Linux.
pub fn global_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Vault-local configuration file.
pub fn vault_config_path(vault_root: &Path) -> PathBuf {
    vault_root.join(VAULT_CONFIG_FILE)
}
