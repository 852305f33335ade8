use crate::error::StorageError;
use crate::paths;
use crate::storage::contract::{StoredDirectory, StoredFile, VaultEntry, VaultStorage};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Directory,
}

/// Mutating command observed by a [`MemoryVault`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateDirectory(String),
    Rename { from: String, to: String },
    Delete(String),
}

#[derive(Default)]
struct Faults {
    read: HashSet<String>,
    create: HashSet<String>,
    rename: HashSet<String>,
    delete: HashSet<String>,
    hidden: HashSet<String>,
}

/// In-memory vault with fault injection and a journal of mutating commands.
///
/// Setup helpers (`add_file`, `add_directory`) create missing parents and are not
/// journaled; commands issued through [`VaultStorage`] follow the same rules as
/// [`DiskVault`](crate::storage::DiskVault): parents must exist, deletes only
/// succeed on empty directories and renames replace an existing file.
#[derive(Default)]
pub struct MemoryVault {
    nodes: RwLock<BTreeMap<String, Node>>,
    faults: RwLock<Faults>,
    journal: RwLock<Vec<Mutation>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, creating missing parent directories.
    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        let path = paths::normalize(path).unwrap_or_else(|_| path.to_string());
        self.add_directory(paths::parent(&path));
        self.nodes.write().insert(path, Node::File(contents.into()));
    }

    /// Insert a directory and its missing ancestors.
    pub fn add_directory(&self, path: &str) {
        let mut nodes = self.nodes.write();
        let mut prefix = String::new();
        for segment in paths::segments(path) {
            prefix = paths::join(&prefix, segment);
            nodes.entry(prefix.clone()).or_insert(Node::Directory);
        }
    }

    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes.read().get(path) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn is_file(&self, path: &str) -> bool {
        matches!(self.nodes.read().get(path), Some(Node::File(_)))
    }

    pub fn is_directory(&self, path: &str) -> bool {
        path.is_empty() || matches!(self.nodes.read().get(path), Some(Node::Directory))
    }

    /// All file paths, sorted.
    pub fn files(&self) -> Vec<String> {
        self.nodes
            .read()
            .iter()
            .filter(|(_, node)| matches!(node, Node::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// All directory paths (excluding the vault root), sorted.
    pub fn directories(&self) -> Vec<String> {
        self.nodes
            .read()
            .iter()
            .filter(|(_, node)| matches!(node, Node::Directory))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Mutating commands received so far, in order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.journal.read().clone()
    }

    pub fn clear_mutations(&self) {
        self.journal.write().clear();
    }

    /// Make `read_binary` fail for `path`.
    pub fn deny_read(&self, path: &str) {
        self.faults.write().read.insert(path.to_string());
    }

    /// Make `create_directory` fail for `path`.
    pub fn deny_create(&self, path: &str) {
        self.faults.write().create.insert(path.to_string());
    }

    /// Make `rename` fail when moving the file at `path`.
    pub fn deny_rename(&self, path: &str) {
        self.faults.write().rename.insert(path.to_string());
    }

    /// Give the directory at `path` an entry `children` does not list, the way a
    /// dotfile sits in a folder on disk; deleting it then reports `NotEmpty`.
    pub fn add_hidden_entry(&self, path: &str) {
        self.add_directory(path);
        self.faults.write().hidden.insert(path.to_string());
    }

    /// Make `delete` fail for the directory at `path`.
    pub fn deny_delete(&self, path: &str) {
        self.faults.write().delete.insert(path.to_string());
    }

    fn denied(path: &str, op: &str) -> StorageError {
        StorageError::Denied {
            path: path.to_string(),
            reason: format!("{} denied by fault injection", op),
        }
    }

    fn record(&self, mutation: Mutation) {
        self.journal.write().push(mutation);
    }
}

#[async_trait]
impl VaultStorage for MemoryVault {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(path.is_empty() || self.nodes.read().contains_key(path))
    }

    async fn resolve(&self, path: &str) -> Result<Option<VaultEntry>, StorageError> {
        let path = paths::normalize(path)?;
        if path.is_empty() {
            return Ok(Some(VaultEntry::Directory(StoredDirectory::new(path))));
        }
        Ok(match self.nodes.read().get(&path) {
            Some(Node::File(_)) => Some(VaultEntry::File(StoredFile::new(path))),
            Some(Node::Directory) => Some(VaultEntry::Directory(StoredDirectory::new(path))),
            None => None,
        })
    }

    async fn children(&self, dir: &StoredDirectory) -> Result<Vec<VaultEntry>, StorageError> {
        if !self.is_directory(&dir.path) {
            return Err(StorageError::NotADirectory(dir.path.clone()));
        }
        let nodes = self.nodes.read();
        Ok(nodes
            .iter()
            .filter(|(path, _)| paths::parent(path) == dir.path)
            .map(|(path, node)| match node {
                Node::File(_) => VaultEntry::File(StoredFile::new(path.clone())),
                Node::Directory => VaultEntry::Directory(StoredDirectory::new(path.clone())),
            })
            .collect())
    }

    async fn create_directory(&self, path: &str) -> Result<(), StorageError> {
        if self.faults.read().create.contains(path) {
            return Err(Self::denied(path, "create"));
        }
        if path.is_empty() {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        let parent = paths::parent(path);
        if !self.is_directory(parent) {
            return Err(StorageError::NotFound(parent.to_string()));
        }
        {
            let mut nodes = self.nodes.write();
            if nodes.contains_key(path) {
                return Err(StorageError::AlreadyExists(path.to_string()));
            }
            nodes.insert(path.to_string(), Node::Directory);
        }
        self.record(Mutation::CreateDirectory(path.to_string()));
        Ok(())
    }

    async fn read_binary(&self, file: &StoredFile) -> Result<Vec<u8>, StorageError> {
        if self.faults.read().read.contains(&file.path) {
            return Err(Self::denied(&file.path, "read"));
        }
        self.file_contents(&file.path)
            .ok_or_else(|| StorageError::NotFound(file.path.clone()))
    }

    async fn rename(&self, file: &StoredFile, new_path: &str) -> Result<(), StorageError> {
        if self.faults.read().rename.contains(&file.path) {
            return Err(Self::denied(&file.path, "rename"));
        }
        let parent = paths::parent(new_path);
        if !self.is_directory(parent) {
            return Err(StorageError::NotFound(parent.to_string()));
        }
        {
            let mut nodes = self.nodes.write();
            if matches!(nodes.get(new_path), Some(Node::Directory)) {
                return Err(StorageError::AlreadyExists(new_path.to_string()));
            }
            let contents = match nodes.remove(&file.path) {
                Some(Node::File(bytes)) => bytes,
                Some(other) => {
                    nodes.insert(file.path.clone(), other);
                    return Err(StorageError::NotFound(file.path.clone()));
                }
                None => return Err(StorageError::NotFound(file.path.clone())),
            };
            nodes.insert(new_path.to_string(), Node::File(contents));
        }
        self.record(Mutation::Rename {
            from: file.path.clone(),
            to: new_path.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, dir: &StoredDirectory) -> Result<(), StorageError> {
        if self.faults.read().delete.contains(&dir.path) {
            return Err(Self::denied(&dir.path, "delete"));
        }
        if dir.is_vault_root() {
            return Err(Self::denied(&dir.path, "vault root delete"));
        }
        if self.faults.read().hidden.contains(&dir.path) {
            return Err(StorageError::NotEmpty(dir.path.clone()));
        }
        {
            let mut nodes = self.nodes.write();
            match nodes.get(&dir.path) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => return Err(StorageError::NotADirectory(dir.path.clone())),
                None => return Err(StorageError::NotFound(dir.path.clone())),
            }
            if nodes.keys().any(|p| paths::parent(p) == dir.path) {
                return Err(StorageError::NotEmpty(dir.path.clone()));
            }
            nodes.remove(&dir.path);
        }
        self.record(Mutation::Delete(dir.path.clone()));
        Ok(())
    }
}
