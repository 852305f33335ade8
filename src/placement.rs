//! Placement configuration consumed by the organizer.

use crate::checksum::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};

/// Whether pruning may remove the configured root itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneScope {
    /// Only directories below the root are removed.
    #[default]
    Descendants,
    /// The root is removed too when it ends up empty.
    IncludeRoot,
}

/// What to do when the derived target path is occupied by another file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the file where it is and report a collision.
    #[default]
    Fail,
    /// Append ` 1`, ` 2`, ... to the file stem until the name is free.
    Suffix,
    /// Replace the occupying file.
    Overwrite,
}

/// Where and how files under a root are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConfig {
    /// Normalized vault path of the organized subtree.
    pub root_path: String,
    /// Number of hash-derived directory levels.
    pub depth: usize,
    /// Prune empty directories after a batch.
    pub prune_empty: bool,
    pub prune_scope: PruneScope,
    pub collision_policy: CollisionPolicy,
    /// Bytes folded into the digest per step.
    pub chunk_size: usize,
}

impl PlacementConfig {
    pub fn new(root_path: impl Into<String>, depth: usize) -> Self {
        Self {
            root_path: root_path.into(),
            depth,
            prune_empty: false,
            prune_scope: PruneScope::default(),
            collision_policy: CollisionPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_pruning(mut self, prune_empty: bool, scope: PruneScope) -> Self {
        self.prune_empty = prune_empty;
        self.prune_scope = scope;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
