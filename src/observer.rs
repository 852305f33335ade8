//! Organize observers
//!
//! The engine reports what it does through an injected [`OrganizeObserver`]
//! instead of a process-wide logger. [`TracingObserver`] forwards events to
//! `tracing`; surfaces such as the CLI add their own observers for user notices.

use crate::error::{OrganizeError, StorageError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something the engine did or failed to do.
#[derive(Debug)]
pub enum OrganizeEvent<'a> {
    FileMoved { from: &'a str, to: &'a str },
    FileUnchanged { path: &'a str },
    FileFailed { path: &'a str, error: &'a OrganizeError },
    DirectoryCreated { path: &'a str },
    DirectoryRemoved { path: &'a str },
    PruneFailed { path: &'a str, error: &'a StorageError },
    RootMissing { path: &'a str },
}

impl OrganizeEvent<'_> {
    /// Stable event name, used as the `event` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrganizeEvent::FileMoved { .. } => "file_moved",
            OrganizeEvent::FileUnchanged { .. } => "file_unchanged",
            OrganizeEvent::FileFailed { .. } => "file_failed",
            OrganizeEvent::DirectoryCreated { .. } => "directory_created",
            OrganizeEvent::DirectoryRemoved { .. } => "directory_removed",
            OrganizeEvent::PruneFailed { .. } => "prune_failed",
            OrganizeEvent::RootMissing { .. } => "root_missing",
        }
    }

    /// Vault path the event is about (the source path for moves).
    pub fn path(&self) -> &str {
        match self {
            OrganizeEvent::FileMoved { from, .. } => from,
            OrganizeEvent::FileUnchanged { path }
            | OrganizeEvent::FileFailed { path, .. }
            | OrganizeEvent::DirectoryCreated { path }
            | OrganizeEvent::DirectoryRemoved { path }
            | OrganizeEvent::PruneFailed { path, .. }
            | OrganizeEvent::RootMissing { path } => path,
        }
    }

    /// Whether the event should be surfaced to the user as a failure notice.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            OrganizeEvent::FileFailed { .. } | OrganizeEvent::PruneFailed { .. }
        )
    }
}

/// Receiver of engine events.
pub trait OrganizeObserver: Send + Sync {
    fn notify(&self, event: &OrganizeEvent<'_>);
}

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl OrganizeObserver for TracingObserver {
    fn notify(&self, event: &OrganizeEvent<'_>) {
        match event {
            OrganizeEvent::FileMoved { from, to } => {
                info!(event = event.kind(), from = %from, to = %to, "Moved file")
            }
            OrganizeEvent::FileUnchanged { path } => {
                debug!(event = event.kind(), path = %path, "File already in place")
            }
            OrganizeEvent::FileFailed { path, error } => {
                warn!(event = event.kind(), path = %path, error = %error, "Failed to organize file")
            }
            OrganizeEvent::DirectoryCreated { path } => {
                debug!(event = event.kind(), path = %path, "Created directory")
            }
            OrganizeEvent::DirectoryRemoved { path } => {
                info!(event = event.kind(), path = %path, "Removed empty directory")
            }
            OrganizeEvent::PruneFailed { path, error } => {
                warn!(event = event.kind(), path = %path, error = %error, "Failed to remove directory")
            }
            OrganizeEvent::RootMissing { path } => {
                info!(event = event.kind(), path = %path, "Attachment folder not found")
            }
        }
    }
}

/// Forwards events to several observers in order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn OrganizeObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn OrganizeObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl OrganizeObserver for ObserverSet {
    fn notify(&self, event: &OrganizeEvent<'_>) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records `kind:path` for every event.
    #[derive(Default)]
    pub(crate) struct RecordingObserver {
        pub(crate) events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub(crate) fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    impl OrganizeObserver for RecordingObserver {
        fn notify(&self, event: &OrganizeEvent<'_>) {
            self.events
                .lock()
                .push(format!("{}:{}", event.kind(), event.path()));
        }
    }
}
