//! Settings structures deserialized from the merged configuration.

use crate::checksum::DEFAULT_CHUNK_SIZE;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::paths;
use crate::placement::{CollisionPolicy, PlacementConfig, PruneScope};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const DEFAULT_ATTACHMENT_PATH: &str = "Attachments";
pub const DEFAULT_PATH_DEPTH: u8 = 2;
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Accepted number of hash-derived directory levels.
pub const PATH_DEPTH_RANGE: RangeInclusive<u8> = 1..=8;

fn default_attachment_path() -> String {
    DEFAULT_ATTACHMENT_PATH.to_string()
}

fn default_path_depth() -> u8 {
    DEFAULT_PATH_DEPTH
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Full configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultSortConfig {
    #[serde(default)]
    pub organizer: OrganizerSettings,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Organizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerSettings {
    /// Vault-relative folder whose files are organized
    #[serde(default = "default_attachment_path")]
    pub attachment_path: String,

    /// Number of hash-derived directory levels (1-8)
    #[serde(default = "default_path_depth")]
    pub path_depth: u8,

    /// Organize automatically when files are created (watch mode)
    #[serde(default)]
    pub auto_organize: bool,

    /// Remove directories left empty after organizing
    #[serde(default = "default_true")]
    pub remove_empty_folders: bool,

    /// Allow pruning to remove the attachment folder itself
    #[serde(default)]
    pub prune_root: bool,

    /// What to do when the target path is occupied
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    /// Bytes hashed per step
    #[serde(default = "default_chunk_size")]
    pub hash_chunk_size: usize,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            attachment_path: default_attachment_path(),
            path_depth: default_path_depth(),
            auto_organize: false,
            remove_empty_folders: default_true(),
            prune_root: false,
            collision_policy: CollisionPolicy::default(),
            hash_chunk_size: default_chunk_size(),
        }
    }
}

impl OrganizerSettings {
    /// Validate the settings and build the engine's placement configuration.
    pub fn placement(&self) -> Result<PlacementConfig, ApiError> {
        if !PATH_DEPTH_RANGE.contains(&self.path_depth) {
            return Err(ApiError::ConfigError(format!(
                "Invalid path_depth: {} (must be between {} and {})",
                self.path_depth,
                PATH_DEPTH_RANGE.start(),
                PATH_DEPTH_RANGE.end()
            )));
        }
        let root = paths::normalize(&self.attachment_path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Invalid attachment_path {:?}: {}",
                self.attachment_path, e
            ))
        })?;
        let scope = if self.prune_root {
            PruneScope::IncludeRoot
        } else {
            PruneScope::Descendants
        };

        Ok(PlacementConfig::new(root, self.path_depth as usize)
            .with_pruning(self.remove_empty_folders, scope)
            .with_collision_policy(self.collision_policy)
            .with_chunk_size(self.hash_chunk_size))
    }
}

/// Watch mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Delay after the last file creation before organizing, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = OrganizerSettings::default();
        assert_eq!(settings.attachment_path, "Attachments");
        assert_eq!(settings.path_depth, 2);
        assert!(!settings.auto_organize);
        assert!(settings.remove_empty_folders);
        assert!(!settings.prune_root);
        assert_eq!(settings.collision_policy, CollisionPolicy::Fail);
        assert_eq!(WatchSettings::default().debounce_ms, 1000);
    }

    #[test]
    fn test_placement_normalizes_root() {
        let settings = OrganizerSettings {
            attachment_path: "/Files//Attachments/".to_string(),
            path_depth: 3,
            prune_root: true,
            ..OrganizerSettings::default()
        };
        let placement = settings.placement().unwrap();
        assert_eq!(placement.root_path, "Files/Attachments");
        assert_eq!(placement.depth, 3);
        assert!(placement.prune_empty);
        assert_eq!(placement.prune_scope, PruneScope::IncludeRoot);
    }

    #[test]
    fn test_placement_rejects_out_of_range_depth() {
        for depth in [0u8, 9, 32] {
            let settings = OrganizerSettings {
                path_depth: depth,
                ..OrganizerSettings::default()
            };
            assert!(matches!(
                settings.placement(),
                Err(ApiError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn test_placement_rejects_escaping_root() {
        let settings = OrganizerSettings {
            attachment_path: "../outside".to_string(),
            ..OrganizerSettings::default()
        };
        assert!(settings.placement().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = VaultSortConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("attachment_path = \"Attachments\""));
        let parsed: VaultSortConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.organizer.path_depth, config.organizer.path_depth);
    }
}
