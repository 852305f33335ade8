//! Vaultsort: Content-Addressed Attachment Placement
//!
//! Moves every file under a vault's attachment folder into a directory derived
//! from its SHA-256 checksum (`Attachments/ba/78/abc.txt`), creating parent
//! directories as needed and pruning the ones left empty. Storage is reached
//! through the [`storage::VaultStorage`] port so the engine runs unchanged over
//! a real directory tree or an in-memory vault.

pub mod checksum;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod observer;
pub mod organizer;
pub mod paths;
pub mod placement;
pub mod storage;
pub mod tooling;
pub mod types;
pub mod watch;

pub use directory::{DirectoryManager, PruneReport};
pub use error::{ApiError, OrganizeError, StorageError};
pub use organizer::{BatchReport, FileOrganizer, Placement};
pub use placement::{CollisionPolicy, PlacementConfig, PruneScope};
pub use types::Checksum;
