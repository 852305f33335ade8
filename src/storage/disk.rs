use crate::error::StorageError;
use crate::paths;
use crate::storage::contract::{StoredDirectory, StoredFile, VaultEntry, VaultStorage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Filesystem-backed vault rooted at a directory.
///
/// Dot-prefixed entries (`.obsidian`, `.git`, `.vaultsort.toml`, ...) are not
/// part of the vault tree and never appear in [`VaultStorage::children`].
/// Symbolic links are never followed: they are neither listed nor resolved, so
/// nothing outside the vault root is reachable and link cycles cannot repeat
/// entries. Entry names are kept exactly as the filesystem returns them.
pub struct DiskVault {
    root: PathBuf,
}

impl DiskVault {
    /// Open a vault at `root`, which must be an existing directory.
    pub fn open(root: &Path) -> Result<Self, StorageError> {
        let root = dunce::canonicalize(root)
            .map_err(|e| StorageError::from_io(&root.to_string_lossy(), e))?;
        if !root.is_dir() {
            return Err(StorageError::NotADirectory(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Canonical filesystem root of the vault.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a vault path.
    pub fn full_path(&self, vault_path: &str) -> Result<PathBuf, StorageError> {
        let normalized = paths::normalize(vault_path)?;
        let mut full = self.root.clone();
        for segment in paths::segments(&normalized) {
            full.push(segment);
        }
        Ok(full)
    }

    /// Vault path of a filesystem location, `None` when outside the vault.
    pub fn vault_path(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                std::path::Component::Normal(name) => parts.push(name.to_str()?.to_string()),
                _ => return None,
            }
        }
        paths::normalize(&parts.join("/")).ok()
    }

    async fn has_entries(dir: &Path) -> bool {
        match tokio::fs::read_dir(dir).await {
            Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl VaultStorage for DiskVault {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.full_path(path)?;
        match tokio::fs::symlink_metadata(&full).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(path, e)),
        }
    }

    async fn resolve(&self, path: &str) -> Result<Option<VaultEntry>, StorageError> {
        let normalized = paths::normalize(path)?;
        let full = self.full_path(&normalized)?;
        let metadata = match tokio::fs::symlink_metadata(&full).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_io(path, e)),
        };
        if metadata.file_type().is_symlink() {
            tracing::debug!(path = %normalized, "Not following symbolic link");
            Ok(None)
        } else if metadata.is_dir() {
            Ok(Some(VaultEntry::Directory(StoredDirectory::new(normalized))))
        } else if metadata.is_file() {
            Ok(Some(VaultEntry::File(StoredFile::new(normalized))))
        } else {
            Ok(None)
        }
    }

    async fn children(&self, dir: &StoredDirectory) -> Result<Vec<VaultEntry>, StorageError> {
        let full = self.full_path(&dir.path)?;
        let mut entries = tokio::fs::read_dir(&full)
            .await
            .map_err(|e| StorageError::from_io(&dir.path, e))?;

        let mut children = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(&dir.path, e))?
        {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(dir = %dir.path, name = ?raw, "Skipping non UTF-8 entry");
                    continue;
                }
            };
            if name.starts_with('.') {
                continue;
            }
            if name.contains('\\') {
                tracing::warn!(dir = %dir.path, name = %name, "Skipping entry with a backslash in its name");
                continue;
            }
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(dir = %dir.path, name = %name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let child_path = paths::join(&dir.path, &name);
            if file_type.is_symlink() {
                tracing::debug!(path = %child_path, "Not following symbolic link");
            } else if file_type.is_dir() {
                children.push(VaultEntry::Directory(StoredDirectory::new(child_path)));
            } else if file_type.is_file() {
                children.push(VaultEntry::File(StoredFile::new(child_path)));
            }
        }
        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    async fn create_directory(&self, path: &str) -> Result<(), StorageError> {
        let full = self.full_path(path)?;
        tokio::fs::create_dir(&full)
            .await
            .map_err(|e| StorageError::from_io(path, e))
    }

    async fn read_binary(&self, file: &StoredFile) -> Result<Vec<u8>, StorageError> {
        let full = self.full_path(&file.path)?;
        tokio::fs::read(&full)
            .await
            .map_err(|e| StorageError::from_io(&file.path, e))
    }

    async fn rename(&self, file: &StoredFile, new_path: &str) -> Result<(), StorageError> {
        let from = self.full_path(&file.path)?;
        let to = self.full_path(new_path)?;
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| StorageError::from_io(&file.path, e))
    }

    async fn delete(&self, dir: &StoredDirectory) -> Result<(), StorageError> {
        if dir.is_vault_root() {
            return Err(StorageError::Denied {
                path: dir.path.clone(),
                reason: "the vault root cannot be deleted".to_string(),
            });
        }
        let full = self.full_path(&dir.path)?;
        match tokio::fs::remove_dir(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(dir.path.clone()))
            }
            Err(e) => {
                if Self::has_entries(&full).await {
                    Err(StorageError::NotEmpty(dir.path.clone()))
                } else {
                    Err(StorageError::from_io(&dir.path, e))
                }
            }
        }
    }
}
