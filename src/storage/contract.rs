use crate::error::StorageError;
use crate::paths;
use async_trait::async_trait;

/// Reference to a file node in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFile {
    pub path: String,
    pub name: String,
}

impl StoredFile {
    /// Build a reference from a normalized vault path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = paths::basename(&path).to_string();
        Self { path, name }
    }
}

/// Reference to a directory node in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredDirectory {
    pub path: String,
}

impl StoredDirectory {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Whether this is the vault root.
    pub fn is_vault_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// A resolved vault node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEntry {
    File(StoredFile),
    Directory(StoredDirectory),
}

impl VaultEntry {
    pub fn path(&self) -> &str {
        match self {
            VaultEntry::File(f) => &f.path,
            VaultEntry::Directory(d) => &d.path,
        }
    }

    pub fn as_file(&self) -> Option<&StoredFile> {
        match self {
            VaultEntry::File(f) => Some(f),
            VaultEntry::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&StoredDirectory> {
        match self {
            VaultEntry::Directory(d) => Some(d),
            VaultEntry::File(_) => None,
        }
    }
}

/// Storage port the placement engine runs against.
///
/// All paths are normalized vault paths. Backends create and destroy nodes; the
/// engine only reads structure and issues create, rename and delete commands.
#[async_trait]
pub trait VaultStorage: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Resolve a path to a node, `None` when absent.
    async fn resolve(&self, path: &str) -> Result<Option<VaultEntry>, StorageError>;

    /// Direct children of a directory, ordered by name.
    async fn children(&self, dir: &StoredDirectory) -> Result<Vec<VaultEntry>, StorageError>;

    /// Create a single directory. The parent must already exist; an existing
    /// node at `path` yields `StorageError::AlreadyExists`.
    async fn create_directory(&self, path: &str) -> Result<(), StorageError>;

    async fn read_binary(&self, file: &StoredFile) -> Result<Vec<u8>, StorageError>;

    /// Move a file. An existing file at `new_path` is replaced.
    async fn rename(&self, file: &StoredFile, new_path: &str) -> Result<(), StorageError>;

    /// Delete an empty directory. Non-empty directories yield `StorageError::NotEmpty`.
    async fn delete(&self, dir: &StoredDirectory) -> Result<(), StorageError>;
}
