//! Auto-organize watch runtime: creation events, debouncing and the daemon.

mod events;
mod runtime;

pub use events::{ChangeEvent, WatchConfig};
pub use runtime::{WatchDaemon, WatchSummary};
