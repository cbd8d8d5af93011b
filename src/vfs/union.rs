//! Union folder: pending local changes layered over the last-known server
//! state. Reads consult the overlay first and fall back to the base, so a
//! staged edit is visible immediately, before any sync round runs. Writes and
//! deletes go to the overlay leg only.

use super::Folder;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct UnionFolder {
    overlay: Arc<dyn Folder>,
    base: Arc<dyn Folder>,
}

impl UnionFolder {
    pub fn new(overlay: Arc<dyn Folder>, base: Arc<dyn Folder>) -> Self {
        UnionFolder { overlay, base }
    }
}

#[async_trait]
impl Folder for UnionFolder {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let (overlay, base) =
            futures::future::try_join(self.overlay.list(), self.base.list()).await?;
        let names: BTreeSet<String> = overlay.into_iter().chain(base).collect();
        Ok(names.into_iter().collect())
    }

    async fn get_text(&self, name: &str) -> Result<String, StorageError> {
        match self.overlay.get_text(name).await {
            Err(StorageError::FileNotFound(_)) => self.base.get_text(name).await,
            other => other,
        }
    }

    async fn set_text(&self, name: &str, text: &str) -> Result<(), StorageError> {
        self.overlay.set_text(name, text).await
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.overlay.delete(name).await
    }

    async fn subfolder(&self, name: &str) -> Result<Arc<dyn Folder>, StorageError> {
        let (overlay, base) = futures::future::try_join(
            self.overlay.subfolder(name),
            self.base.subfolder(name),
        )
        .await?;
        Ok(Arc::new(UnionFolder::new(overlay, base)))
    }
}
