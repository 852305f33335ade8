//! Watch events, debouncing, and configuration.

use crate::config::settings::DEFAULT_DEBOUNCE_MS;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Quiet period after the last creation before organizing, in milliseconds
    pub debounce_ms: u64,
    /// Idle poll interval used to notice a stop request, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            poll_interval_ms: 250,
        }
    }
}

/// Vault change relevant to auto-organize
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// A file was created at this vault path
    Created(String),
}

/// Collects file creations and reports when the quiet period has elapsed.
///
/// Every new creation restarts the window so a file still being written is not
/// hashed half-way through.
pub(crate) struct CreationDebouncer {
    window: Duration,
    pending: BTreeSet<String>,
    last_event: Option<Instant>,
}

impl CreationDebouncer {
    pub(crate) fn new(debounce_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(debounce_ms),
            pending: BTreeSet::new(),
            last_event: None,
        }
    }

    pub(crate) fn add_event(&mut self, event: ChangeEvent, now: Instant) {
        match event {
            ChangeEvent::Created(path) => {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(now);
    }

    /// When the pending batch becomes due, if anything is pending.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        if self.pending.is_empty() {
            return None;
        }
        self.last_event.map(|t| t + self.window)
    }

    pub(crate) fn is_due(&self, now: Instant) -> bool {
        self.deadline().map(|d| now >= d).unwrap_or(false)
    }

    /// Drain the pending paths.
    pub(crate) fn take_batch(&mut self) -> Vec<String> {
        self.last_event = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
