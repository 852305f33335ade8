//! Built-in defaults registered at the bottom of the source stack.

use crate::config::settings::{
    DEFAULT_ATTACHMENT_PATH, DEFAULT_DEBOUNCE_MS, DEFAULT_PATH_DEPTH,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder with the documented defaults for the organizer surface.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("organizer.attachment_path", DEFAULT_ATTACHMENT_PATH)?
        .set_default("organizer.path_depth", DEFAULT_PATH_DEPTH as i64)?
        .set_default("organizer.auto_organize", false)?
        .set_default("organizer.remove_empty_folders", true)?
        .set_default("watch.debounce_ms", DEFAULT_DEBOUNCE_MS as i64)
}
