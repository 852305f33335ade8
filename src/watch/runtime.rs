//! Watch daemon and runtime logic.

use super::events::{ChangeEvent, CreationDebouncer, WatchConfig};
use crate::error::{ApiError, StorageError};
use crate::organizer::{BatchReport, FileOrganizer};
use crate::paths;
use crate::placement::PlacementConfig;
use crate::storage::DiskVault;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Running totals over the organize passes of a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub passes: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub pruned: usize,
}

impl WatchSummary {
    fn record(&mut self, report: &BatchReport) {
        self.passes += 1;
        self.moved += report.moved.len();
        self.unchanged += report.unchanged;
        self.failed += report.failures.len();
        self.pruned += report.prune.as_ref().map(|p| p.removed_count()).unwrap_or(0);
    }
}

/// Auto-organize daemon
///
/// Watches the vault for file creations under the attachment folder and, once
/// creations have been quiet for the debounce window, runs a full organize pass.
/// A pass in progress always runs to completion; [`WatchDaemon::stop`] takes
/// effect between passes and is permanent, even when requested before `run`.
pub struct WatchDaemon {
    organizer: FileOrganizer,
    vault: Arc<DiskVault>,
    placement: PlacementConfig,
    config: WatchConfig,
    running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
}

impl WatchDaemon {
    /// Create a new watch daemon
    pub fn new(
        organizer: FileOrganizer,
        vault: Arc<DiskVault>,
        placement: PlacementConfig,
        config: WatchConfig,
    ) -> Self {
        Self {
            organizer,
            vault,
            placement,
            config,
            running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
        }
    }

    /// Run until stopped or the watcher goes away, returning totals over the passes made.
    pub async fn run(&self) -> Result<WatchSummary, ApiError> {
        let mut summary = WatchSummary::default();
        if *self.stop_requested.read() {
            debug!("Stop requested before watch started");
            return Ok(summary);
        }
        *self.running.write() = true;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| watch_error("Failed to create watcher", e))?;

        watcher
            .watch(self.vault.root(), RecursiveMode::Recursive)
            .map_err(|e| watch_error("Failed to watch vault", e))?;

        info!(
            vault = ?self.vault.root(),
            root = %self.placement.root_path,
            debounce_ms = self.config.debounce_ms,
            "Watching vault"
        );

        let mut debouncer = CreationDebouncer::new(self.config.debounce_ms);
        let poll = Duration::from_millis(self.config.poll_interval_ms.max(1));

        loop {
            if *self.stop_requested.read() {
                break;
            }

            let wait = debouncer
                .deadline()
                .map(|d| d.saturating_duration_since(Instant::now()).min(poll))
                .unwrap_or(poll);

            match tokio::time::timeout(wait, rx.recv()).await {
                Ok(Some(Ok(event))) => {
                    for change in self.convert_event(event) {
                        debug!(?change, "Queued for auto-organize");
                        debouncer.add_event(change, Instant::now());
                    }
                }
                Ok(Some(Err(e))) => {
                    warn!("Watch error: {}", e);
                }
                Ok(None) => {
                    error!("Watcher channel disconnected");
                    break;
                }
                Err(_) => {}
            }

            if debouncer.is_due(Instant::now()) {
                let batch = debouncer.take_batch();
                info!(created = batch.len(), "Auto-organizing after file creation");
                let report = self.organizer.organize_attachments(&self.placement).await;
                summary.record(&report);
            }
        }

        *self.running.write() = false;
        info!(passes = summary.passes, moved = summary.moved, "Watch stopped");
        Ok(summary)
    }

    /// Ask the daemon to stop once the current pass, if any, has finished.
    pub fn stop(&self) {
        *self.stop_requested.write() = true;
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    fn convert_event(&self, event: Event) -> Vec<ChangeEvent> {
        if !matches!(event.kind, EventKind::Create(_)) {
            return Vec::new();
        }
        event
            .paths
            .iter()
            .filter_map(|p| self.relevant_creation(p))
            .map(ChangeEvent::Created)
            .collect()
    }

    /// Vault path of a created file under the attachment folder.
    fn relevant_creation(&self, full: &Path) -> Option<String> {
        let vault_path = self.vault.vault_path(full)?;
        let hidden = paths::segments(&vault_path).any(|s| s.starts_with('.'));
        if hidden || !paths::is_within(&vault_path, &self.placement.root_path) {
            return None;
        }
        let is_file = std::fs::symlink_metadata(full)
            .map(|m| m.file_type().is_file())
            .unwrap_or(false);
        is_file.then_some(vault_path)
    }
}

fn watch_error(context: &str, e: notify::Error) -> ApiError {
    ApiError::StorageError(StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, e),
    )))
}
