//! Environment variable source: VAULTSORT_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses VAULTSORT prefix and __ as separator for nested keys, e.g.
/// `VAULTSORT__ORGANIZER__PATH_DEPTH=3`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("VAULTSORT")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
