//! Vault path handling
//!
//! Vault paths are slash-delimited and relative to the vault root. The empty
//! string denotes the root itself. [`normalize`] only fixes structure: names are
//! kept byte-for-byte as the storage reports them, so a path always addresses
//! the node it came from. Canonically equivalent spellings (NFC vs NFD) are
//! matched with [`same_path`] and [`is_within`].

use crate::error::StorageError;
use unicode_normalization::UnicodeNormalization;

/// Normalize a raw vault path.
///
/// Converts backslashes, drops empty and `.` segments and rejects `..` so a path
/// can never escape the vault. Unicode is left untouched.
pub fn normalize(raw: &str) -> Result<String, StorageError> {
    let slashed = raw.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(StorageError::InvalidPath(raw.to_string())),
            s => parts.push(s),
        }
    }
    Ok(parts.join("/"))
}

/// NFC form of a path, used for comparisons only.
pub fn comparable(path: &str) -> String {
    path.nfc().collect()
}

/// Whether two vault paths name the same node up to Unicode normalization.
pub fn same_path(a: &str, b: &str) -> bool {
    a == b || comparable(a) == comparable(b)
}

/// Join a child name onto a normalized base path.
pub fn join(base: &str, name: &str) -> String {
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, name),
    }
}

/// Parent directory of a normalized path (`""` for top-level entries).
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(head, _)| head).unwrap_or("")
}

/// Final segment of a normalized path.
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, tail)| tail).unwrap_or(path)
}

/// Non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether `path` is `root` or lies beneath it, up to Unicode normalization.
pub fn is_within(path: &str, root: &str) -> bool {
    if root.is_empty() {
        return true;
    }
    let (path, root) = (comparable(path), comparable(root));
    path == root
        || path
            .strip_prefix(root.as_str())
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// Split a file name into stem and extension (extension without the dot).
///
/// Dotfiles such as `.hidden` have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
