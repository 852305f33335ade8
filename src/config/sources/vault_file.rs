//! Vault-local config file source (`<vault>/.vaultsort.toml`), optional.

use crate::config::paths;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vault_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = paths::vault_config_path(vault_root);
    Ok(builder.add_source(File::from(path).required(false)))
}
