//! File Organizer
//!
//! Places files at the location derived from their content hash. A batch run
//! enumerates the whole root before touching anything (a frozen worklist),
//! processes files one at a time, isolates per-file failures and optionally
//! prunes empty directories once at the end.

use crate::checksum;
use crate::directory::{DirectoryManager, PruneReport};
use crate::error::{OrganizeError, StorageOp};
use crate::observer::{OrganizeEvent, OrganizeObserver};
use crate::paths;
use crate::placement::{CollisionPolicy, PlacementConfig};
use crate::storage::{StoredDirectory, StoredFile, VaultEntry, VaultStorage};
use crate::types::{checksum_hex, Checksum};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Upper bound on ` N` suffixes tried under [`CollisionPolicy::Suffix`].
const MAX_SUFFIX: u32 = 9_999;

/// Result of placing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Moved { from: String, to: String },
    Unchanged { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedFile {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

impl FileFailure {
    fn from_error(error: &OrganizeError) -> Self {
        Self {
            path: error.path().to_string(),
            error: error.to_string(),
        }
    }
}

/// Summary of an organize-all run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root_path: String,
    /// `false` when the root did not resolve to a directory; nothing was done.
    pub root_found: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub moved: Vec<MovedFile>,
    pub unchanged: usize,
    pub failures: Vec<FileFailure>,
    pub prune: Option<PruneReport>,
}

impl BatchReport {
    fn new(root_path: &str) -> Self {
        let now = Utc::now();
        Self {
            root_path: root_path.to_string(),
            root_found: false,
            started_at: now,
            finished_at: now,
            moved: Vec::new(),
            unchanged: 0,
            failures: Vec::new(),
            prune: None,
        }
    }

    /// Files handled successfully (moved or already in place).
    pub fn processed(&self) -> usize {
        self.moved.len() + self.unchanged
    }

    /// Files in the worklist.
    pub fn total(&self) -> usize {
        self.processed() + self.failures.len()
    }
}

/// A move a batch run would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub from: String,
    pub to: String,
    pub checksum: String,
}

/// Dry-run result of [`FileOrganizer::plan_attachments`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub root_path: String,
    pub root_found: bool,
    pub moves: Vec<PlannedMove>,
    pub unchanged: usize,
    pub failures: Vec<FileFailure>,
}

/// Content-addressed placement engine.
#[derive(Clone)]
pub struct FileOrganizer {
    storage: Arc<dyn VaultStorage>,
    directories: DirectoryManager,
    observer: Arc<dyn OrganizeObserver>,
}

impl FileOrganizer {
    pub fn new(storage: Arc<dyn VaultStorage>, observer: Arc<dyn OrganizeObserver>) -> Self {
        let directories = DirectoryManager::new(Arc::clone(&storage), Arc::clone(&observer));
        Self {
            storage,
            directories,
            observer,
        }
    }

    pub fn directories(&self) -> &DirectoryManager {
        &self.directories
    }

    pub async fn compute_checksum(
        &self,
        file: &StoredFile,
        chunk_size: usize,
    ) -> Result<Checksum, OrganizeError> {
        checksum::compute_checksum(self.storage.as_ref(), file, chunk_size).await
    }

    /// Target directory for a checksum under `config`.
    pub fn derive_path(checksum: &Checksum, config: &PlacementConfig) -> String {
        checksum::derive_path(checksum, &config.root_path, config.depth)
    }

    /// Checksum and full target path of `file`.
    pub async fn target_path(
        &self,
        file: &StoredFile,
        config: &PlacementConfig,
    ) -> Result<(Checksum, String), OrganizeError> {
        let checksum = self.compute_checksum(file, config.chunk_size).await?;
        let target_dir = Self::derive_path(&checksum, config);
        Ok((checksum, paths::join(&target_dir, &file.name)))
    }

    /// Move `file` to its content-derived location.
    ///
    /// A file already at its target is left untouched.
    pub async fn organize_file(
        &self,
        file: &StoredFile,
        config: &PlacementConfig,
    ) -> Result<Placement, OrganizeError> {
        let (checksum, target) = self.target_path(file, config).await?;
        if paths::same_path(&target, &file.path) {
            self.observer
                .notify(&OrganizeEvent::FileUnchanged { path: &file.path });
            return Ok(Placement::Unchanged {
                path: file.path.clone(),
            });
        }

        let target_dir = paths::parent(&target);
        self.directories
            .create_directory_recursive(target_dir)
            .await?;
        let destination = self
            .free_destination(file, &target, config.collision_policy)
            .await?;

        self.storage
            .rename(file, &destination)
            .await
            .map_err(|e| OrganizeError::storage(StorageOp::Rename, &file.path, e))?;

        debug!(
            checksum = %checksum_hex(&checksum),
            from = %file.path,
            to = %destination,
            "Placed file"
        );
        self.observer.notify(&OrganizeEvent::FileMoved {
            from: &file.path,
            to: &destination,
        });
        Ok(Placement::Moved {
            from: file.path.clone(),
            to: destination,
        })
    }

    /// Resolve a vault path to a file and organize it.
    pub async fn organize_path(
        &self,
        path: &str,
        config: &PlacementConfig,
    ) -> Result<Placement, OrganizeError> {
        let normalized = paths::normalize(path).map_err(|e| {
            OrganizeError::storage(StorageOp::Resolve, path, e)
        })?;
        match self.storage.resolve(&normalized).await {
            Ok(Some(VaultEntry::File(file))) => self.organize_file(&file, config).await,
            Ok(_) => Err(OrganizeError::NotFound { path: normalized }),
            Err(e) => Err(OrganizeError::storage(StorageOp::Resolve, &normalized, e)),
        }
    }

    /// Every file below `root`, depth-first pre-order.
    pub async fn enumerate_files(
        &self,
        root: &StoredDirectory,
    ) -> Result<Vec<StoredFile>, OrganizeError> {
        let mut files = Vec::new();
        let mut stack = vec![VaultEntry::Directory(root.clone())];
        while let Some(entry) = stack.pop() {
            match entry {
                VaultEntry::File(file) => files.push(file),
                VaultEntry::Directory(dir) => {
                    let children = self
                        .storage
                        .children(&dir)
                        .await
                        .map_err(|e| OrganizeError::storage(StorageOp::Resolve, &dir.path, e))?;
                    stack.extend(children.into_iter().rev());
                }
            }
        }
        Ok(files)
    }

    /// Organize every file under `config.root_path`.
    ///
    /// Per-file failures are reported to the observer and recorded; they never
    /// stop the batch. A missing root is reported and yields an empty report.
    pub async fn organize_attachments(&self, config: &PlacementConfig) -> BatchReport {
        let mut report = BatchReport::new(&config.root_path);
        let Some(worklist) = self
            .frozen_worklist(config, &mut report.root_found, &mut report.failures)
            .await
        else {
            report.finished_at = Utc::now();
            return report;
        };

        info!(
            root = %config.root_path,
            files = worklist.len(),
            depth = config.depth,
            "Organizing attachments"
        );
        for file in &worklist {
            match self.organize_file(file, config).await {
                Ok(Placement::Moved { from, to }) => report.moved.push(MovedFile { from, to }),
                Ok(Placement::Unchanged { .. }) => report.unchanged += 1,
                Err(e) => self.record_failure(&mut report.failures, &e),
            }
        }

        if config.prune_empty {
            report.prune = Some(
                self.directories
                    .clean_empty_directories(&config.root_path, config.prune_scope)
                    .await,
            );
        }

        report.finished_at = Utc::now();
        info!(
            root = %config.root_path,
            moved = report.moved.len(),
            unchanged = report.unchanged,
            failed = report.failures.len(),
            pruned = report.prune.as_ref().map(|p| p.removed_count()).unwrap_or(0),
            "Organized attachments"
        );
        report
    }

    /// Compute where every file under the root would go, without moving anything.
    pub async fn plan_attachments(&self, config: &PlacementConfig) -> Plan {
        let mut plan = Plan {
            root_path: config.root_path.clone(),
            ..Plan::default()
        };
        let Some(worklist) = self
            .frozen_worklist(config, &mut plan.root_found, &mut plan.failures)
            .await
        else {
            return plan;
        };

        for file in &worklist {
            match self.target_path(file, config).await {
                Ok((_, target)) if paths::same_path(&target, &file.path) => {
                    plan.unchanged += 1
                }
                Ok((checksum, target)) => plan.moves.push(PlannedMove {
                    from: file.path.clone(),
                    to: target,
                    checksum: checksum_hex(&checksum),
                }),
                Err(e) => self.record_failure(&mut plan.failures, &e),
            }
        }
        plan
    }

    /// Resolve the root and snapshot its files; `None` when there is nothing to do.
    async fn frozen_worklist(
        &self,
        config: &PlacementConfig,
        root_found: &mut bool,
        failures: &mut Vec<FileFailure>,
    ) -> Option<Vec<StoredFile>> {
        let root = match self.storage.resolve(&config.root_path).await {
            Ok(Some(VaultEntry::Directory(dir))) => dir,
            Ok(_) => {
                self.observer.notify(&OrganizeEvent::RootMissing {
                    path: &config.root_path,
                });
                return None;
            }
            Err(e) => {
                let err = OrganizeError::storage(StorageOp::Resolve, &config.root_path, e);
                self.record_failure(failures, &err);
                return None;
            }
        };
        *root_found = true;

        match self.enumerate_files(&root).await {
            Ok(files) => Some(files),
            Err(e) => {
                self.record_failure(failures, &e);
                None
            }
        }
    }

    fn record_failure(&self, failures: &mut Vec<FileFailure>, error: &OrganizeError) {
        self.observer.notify(&OrganizeEvent::FileFailed {
            path: error.path(),
            error,
        });
        failures.push(FileFailure::from_error(error));
    }

    /// Destination for `file` given the occupant (if any) of `target`.
    ///
    /// Nodes the storage lists but will not resolve (such as links) still
    /// occupy their path and are never overwritten.
    async fn free_destination(
        &self,
        file: &StoredFile,
        target: &str,
        policy: CollisionPolicy,
    ) -> Result<String, OrganizeError> {
        let occupant = match self.resolve(target).await? {
            Some(entry) => Some(entry.as_file().is_some()),
            None if self.exists(target).await? => Some(false),
            None => None,
        };
        match (occupant, policy) {
            (None, _) => Ok(target.to_string()),
            (Some(true), CollisionPolicy::Overwrite) => Ok(target.to_string()),
            (Some(_), CollisionPolicy::Suffix) => {
                let dir = paths::parent(target);
                let (stem, ext) = paths::split_extension(&file.name);
                for n in 1..=MAX_SUFFIX {
                    let name = match ext {
                        Some(ext) => format!("{} {}.{}", stem, n, ext),
                        None => format!("{} {}", stem, n),
                    };
                    let candidate = paths::join(dir, &name);
                    if !self.exists(&candidate).await? {
                        return Ok(candidate);
                    }
                }
                Err(OrganizeError::Collision {
                    path: target.to_string(),
                })
            }
            (Some(_), _) => Err(OrganizeError::Collision {
                path: target.to_string(),
            }),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, OrganizeError> {
        self.storage
            .exists(path)
            .await
            .map_err(|e| OrganizeError::storage(StorageOp::Resolve, path, e))
    }

    async fn resolve(&self, path: &str) -> Result<Option<VaultEntry>, OrganizeError> {
        self.storage
            .resolve(path)
            .await
            .map_err(|e| OrganizeError::storage(StorageOp::Resolve, path, e))
    }
}
