//! Core types for content-addressed attachment placement.

/// Length in bytes of a SHA-256 digest.
pub const CHECKSUM_LEN: usize = 32;

/// Checksum: SHA-256 digest of a file's full byte content
pub type Checksum = [u8; CHECKSUM_LEN];

/// Render a checksum as lowercase hex.
pub fn checksum_hex(checksum: &Checksum) -> String {
    hex::encode(checksum)
}
