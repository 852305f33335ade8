//! Directory Manager
//!
//! Staged `mkdir -p` and post-order pruning of empty directories against the
//! storage port. Both operations are stateless tree walks.

use crate::error::{OrganizeError, StorageError, StorageOp};
use crate::observer::{OrganizeEvent, OrganizeObserver};
use crate::paths;
use crate::placement::PruneScope;
use crate::storage::{StoredDirectory, VaultEntry, VaultStorage};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A directory pruning could not remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Removed directories, deepest first.
    pub removed: Vec<String>,
    /// Directories that look empty but hold entries outside the vault tree
    /// (dotfiles, links); left alone without counting as failures.
    pub kept: Vec<String>,
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Creates and prunes directories in a vault.
#[derive(Clone)]
pub struct DirectoryManager {
    storage: Arc<dyn VaultStorage>,
    observer: Arc<dyn OrganizeObserver>,
}

impl DirectoryManager {
    pub fn new(storage: Arc<dyn VaultStorage>, observer: Arc<dyn OrganizeObserver>) -> Self {
        Self { storage, observer }
    }

    /// Create `path` and any missing ancestors, returning the directories created.
    ///
    /// A prefix that turns out to exist when creating it counts as success.
    /// Ancestors created before a failure are left in place.
    pub async fn create_directory_recursive(&self, path: &str) -> Result<Vec<String>, OrganizeError> {
        let mut created = Vec::new();
        if self.exists(path).await? {
            return Ok(created);
        }

        let mut prefix = String::new();
        for segment in paths::segments(path) {
            prefix = paths::join(&prefix, segment);
            if self.exists(&prefix).await? {
                continue;
            }
            match self.storage.create_directory(&prefix).await {
                Ok(()) => {
                    self.observer
                        .notify(&OrganizeEvent::DirectoryCreated { path: &prefix });
                    created.push(prefix.clone());
                }
                Err(StorageError::AlreadyExists(_)) => {
                    debug!(path = %prefix, "Directory appeared before creation");
                }
                Err(e) => return Err(OrganizeError::storage(StorageOp::Create, &prefix, e)),
            }
        }
        Ok(created)
    }

    /// Remove every directory under `root_path` that holds no files.
    ///
    /// Missing roots are a no-op. Failures to list or delete a directory are
    /// recorded and reported; the walk continues and the affected parent simply
    /// keeps a child.
    pub async fn clean_empty_directories(&self, root_path: &str, scope: PruneScope) -> PruneReport {
        let mut report = PruneReport::default();
        let root = match self.storage.resolve(root_path).await {
            Ok(Some(VaultEntry::Directory(dir))) => dir,
            Ok(_) => {
                debug!(root = %root_path, "Prune root is not a directory, nothing to do");
                return report;
            }
            Err(e) => {
                self.record_failure(&mut report, root_path, &e);
                return report;
            }
        };

        let removable_root = scope == PruneScope::IncludeRoot && !root.is_vault_root();
        self.prune(root, removable_root, &mut report).await;
        debug!(
            root = %root_path,
            removed = report.removed.len(),
            failures = report.failures.len(),
            "Pruning finished"
        );
        report
    }

    /// Post-order walk; resolves to `true` when `dir` was removed.
    fn prune<'a>(
        &'a self,
        dir: StoredDirectory,
        removable: bool,
        report: &'a mut PruneReport,
    ) -> BoxFuture<'a, bool> {
        async move {
            let children = match self.storage.children(&dir).await {
                Ok(children) => children,
                Err(e) => {
                    self.record_failure(report, &dir.path, &e);
                    return false;
                }
            };

            let mut remaining = 0usize;
            for child in children {
                match child {
                    VaultEntry::File(_) => remaining += 1,
                    VaultEntry::Directory(sub) => {
                        if !self.prune(sub, true, report).await {
                            remaining += 1;
                        }
                    }
                }
            }

            if remaining > 0 || !removable {
                return false;
            }

            match self.storage.delete(&dir).await {
                Ok(()) => {
                    self.observer
                        .notify(&OrganizeEvent::DirectoryRemoved { path: &dir.path });
                    report.removed.push(dir.path);
                    true
                }
                Err(StorageError::NotEmpty(_)) => {
                    debug!(path = %dir.path, "Directory holds hidden entries, keeping it");
                    report.kept.push(dir.path);
                    false
                }
                Err(e) => {
                    self.record_failure(report, &dir.path, &e);
                    false
                }
            }
        }
        .boxed()
    }

    fn record_failure(&self, report: &mut PruneReport, path: &str, error: &StorageError) {
        self.observer
            .notify(&OrganizeEvent::PruneFailed { path, error });
        report.failures.push(PruneFailure {
            path: path.to_string(),
            error: error.to_string(),
        });
    }

    async fn exists(&self, path: &str) -> Result<bool, OrganizeError> {
        self.storage
            .exists(path)
            .await
            .map_err(|e| OrganizeError::storage(StorageOp::Resolve, path, e))
    }
}
