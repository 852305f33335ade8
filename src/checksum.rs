//! Checksum computation and hash-to-path derivation.

use crate::error::OrganizeError;
use crate::paths;
use crate::storage::{StoredFile, VaultStorage};
use crate::types::{Checksum, CHECKSUM_LEN};
use sha2::{Digest, Sha256};

/// Default number of bytes folded into the digest per step.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Hash a byte buffer in `chunk_size` steps.
///
/// The digest does not depend on `chunk_size`; `0` hashes the buffer in one step.
pub fn checksum_bytes(bytes: &[u8], chunk_size: usize) -> Checksum {
    let mut hasher = Sha256::new();
    if chunk_size == 0 {
        hasher.update(bytes);
    } else {
        for chunk in bytes.chunks(chunk_size) {
            hasher.update(chunk);
        }
    }
    hasher.finalize().into()
}

/// Read a file through the storage port and compute its SHA-256 checksum.
pub async fn compute_checksum(
    storage: &dyn VaultStorage,
    file: &StoredFile,
    chunk_size: usize,
) -> Result<Checksum, OrganizeError> {
    let bytes = storage
        .read_binary(file)
        .await
        .map_err(|source| OrganizeError::ReadFault {
            path: file.path.clone(),
            source,
        })?;
    Ok(checksum_bytes(&bytes, chunk_size))
}

/// Derive the target directory for a checksum.
///
/// Appends one two-digit lowercase hex segment per leading checksum byte, up to
/// `depth` segments. Depths beyond the digest length are clamped.
pub fn derive_path(checksum: &Checksum, root_path: &str, depth: usize) -> String {
    checksum
        .iter()
        .take(depth.min(CHECKSUM_LEN))
        .fold(root_path.to_string(), |dir, byte| {
            paths::join(&dir, &format!("{:02x}", byte))
        })
}
