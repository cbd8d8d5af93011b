//! Virtual filesystem capability
//!
//! Folders are capability objects: holding one grants access to exactly that
//! subtree and nothing else. The sync engine is written against the [`Folder`]
//! trait so it runs identically over the real disk, an in-memory fake, or the
//! union overlay in [`union`].

pub mod union;

pub use union::UnionFolder;

use crate::error::StorageError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Flat folder of named text files.
///
/// `delete` of a missing file is a no-op, not an error. `subfolder` creates
/// the child on first use and reuses it afterwards.
#[async_trait]
pub trait Folder: Send + Sync {
    /// Names of the files currently in this folder, in enumeration order.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    async fn get_text(&self, name: &str) -> Result<String, StorageError>;

    async fn set_text(&self, name: &str, text: &str) -> Result<(), StorageError>;

    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    async fn subfolder(&self, name: &str) -> Result<Arc<dyn Folder>, StorageError>;
}

/// Reject names that could escape the folder's subtree.
fn check_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Folder backed by a directory on disk via `tokio::fs`.
#[derive(Debug, Clone)]
pub struct DiskFolder {
    root: PathBuf,
}

impl DiskFolder {
    /// Open a folder rooted at `path`, creating the directory if needed.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = path.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(DiskFolder { root })
    }
}

#[async_trait]
impl Folder for DiskFolder {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    async fn get_text(&self, name: &str) -> Result<String, StorageError> {
        check_name(name)?;
        match tokio::fs::read_to_string(self.root.join(name)).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_text(&self, name: &str, text: &str) -> Result<(), StorageError> {
        check_name(name)?;
        tokio::fs::write(self.root.join(name), text).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        check_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn subfolder(&self, name: &str) -> Result<Arc<dyn Folder>, StorageError> {
        check_name(name)?;
        let child = DiskFolder::create(self.root.join(name)).await?;
        Ok(Arc::new(child))
    }
}

/// In-memory folder for tests and fakes.
#[derive(Default, Clone)]
pub struct MemoryFolder {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    files: Mutex<BTreeMap<String, String>>,
    folders: Mutex<BTreeMap<String, MemoryFolder>>,
}

impl MemoryFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the folder's contents, for assertions.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.files.lock().clone()
    }
}

#[async_trait]
impl Folder for MemoryFolder {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.files.lock().keys().cloned().collect())
    }

    async fn get_text(&self, name: &str) -> Result<String, StorageError> {
        check_name(name)?;
        self.inner
            .files
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))
    }

    async fn set_text(&self, name: &str, text: &str) -> Result<(), StorageError> {
        check_name(name)?;
        self.inner
            .files
            .lock()
            .insert(name.to_string(), text.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        check_name(name)?;
        self.inner.files.lock().remove(name);
        Ok(())
    }

    async fn subfolder(&self, name: &str) -> Result<Arc<dyn Folder>, StorageError> {
        check_name(name)?;
        let child = self
            .inner
            .folders
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(Arc::new(child))
    }
}
