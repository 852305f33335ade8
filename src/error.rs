//! Error types
//!
//! Three layers: `StorageError` is what the storage port reports, `OrganizeError`
//! is the placement engine's taxonomy, and `ApiError` is what the outer surfaces
//! (config, logging, watch, CLI) return.

use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid vault path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    #[error("Operation denied on {path}: {reason}")]
    Denied { path: String, reason: String },
}

impl StorageError {
    /// Map an I/O error on `path` to the closest storage error.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            std::io::ErrorKind::PermissionDenied => StorageError::Denied {
                path: path.to_string(),
                reason: err.to_string(),
            },
            _ => StorageError::IoError(err),
        }
    }
}

/// Storage operation that produced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Create,
    Rename,
    Delete,
    Resolve,
}

impl std::fmt::Display for StorageOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageOp::Create => "create",
            StorageOp::Rename => "rename",
            StorageOp::Delete => "delete",
            StorageOp::Resolve => "resolve",
        };
        f.write_str(name)
    }
}

/// Failure while placing a single file.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Failed to read {path}: {source}")]
    ReadFault {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("Storage refused to {op} {path}: {source}")]
    StorageFault {
        op: StorageOp,
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("Target already occupied by another file: {path}")]
    Collision { path: String },

    #[error("Not found: {path}")]
    NotFound { path: String },
}

impl OrganizeError {
    pub(crate) fn storage(op: StorageOp, path: &str, source: StorageError) -> Self {
        OrganizeError::StorageFault {
            op,
            path: path.to_string(),
            source,
        }
    }

    /// Vault path the failure refers to.
    pub fn path(&self) -> &str {
        match self {
            OrganizeError::ReadFault { path, .. }
            | OrganizeError::StorageFault { path, .. }
            | OrganizeError::Collision { path }
            | OrganizeError::NotFound { path } => path,
        }
    }
}

/// Error returned by the outer surfaces.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_kinds() {
        let err = StorageError::from_io(
            "a/b",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, StorageError::NotFound(p) if p == "a/b"));

        let err = StorageError::from_io(
            "a",
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "dup"),
        );
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        let err = StorageError::from_io(
            "a",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, StorageError::Denied { .. }));
    }

    #[test]
    fn test_organize_error_path_and_message() {
        let err = OrganizeError::storage(
            StorageOp::Rename,
            "Attachments/x.png",
            StorageError::NotFound("Attachments/x.png".to_string()),
        );
        assert_eq!(err.path(), "Attachments/x.png");
        assert!(err.to_string().starts_with("Storage refused to rename"));
    }
}
