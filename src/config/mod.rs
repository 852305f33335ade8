//! Configuration
//!
//! Layered settings: built-in defaults, the global config file, the vault's
//! `.vaultsort.toml` and `VAULTSORT__*` environment variables (highest).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod settings;
pub mod sources;

pub use facade::ConfigLoader;
pub use settings::{OrganizerSettings, VaultSortConfig, WatchSettings};
