//! Vault storage port and its adapters.

pub mod contract;
pub mod disk;
pub mod memory;

pub use contract::{StoredDirectory, StoredFile, VaultEntry, VaultStorage};
pub use disk::DiskVault;
pub use memory::{MemoryVault, Mutation};
