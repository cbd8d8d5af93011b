//! Repository layout
//!
//! One repository lives under `repos/<repo-id>/` in the host's folder
//! capability, where the id is derived from the sync key (never the raw key
//! itself). The layout holds three resources:
//!
//! - `changes/` — edits staged locally but not yet acknowledged by the server
//! - `data/` — the last-known server-accepted state
//! - `status.json` — the version cursor (`lastHash`)
//!
//! plus a union view that reads changes over data, which is what every
//! consumer of the repository reads through.

pub mod changes;
pub mod status;

pub use changes::{save_changes, ChangeSet};
pub use status::StatusFile;

use crate::error::{StorageError, SyncError};
use crate::sync::{sync_once, sync_repo, SyncOutcome, SyncTransport};
use crate::types::{DataKey, RepoId, SyncKey};
use crate::vfs::{Folder, UnionFolder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Key info record as carried on the wire and in wallet metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfo {
    pub keys: RepoKeys,
}

/// Base64-encoded key pair for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoKeys {
    #[serde(rename = "dataKey")]
    pub data_key: String,
    #[serde(rename = "syncKey")]
    pub sync_key: String,
}

/// Resolved folders and handles for one repository.
pub struct RepoPaths {
    pub data_key: DataKey,
    pub sync_key: SyncKey,
    pub repo_id: RepoId,
    pub changes_folder: Arc<dyn Folder>,
    pub data_folder: Arc<dyn Folder>,
    /// Union view: changes shadow data. All reads go through here.
    pub folder: Arc<dyn Folder>,
    pub status_file: StatusFile,
}

impl RepoPaths {
    /// Resolve (creating on first use) the repository layout under `root`.
    ///
    /// Idempotent: the same sync key always resolves to the same physical
    /// location, and pre-existing folders are reused as-is.
    pub async fn build(root: Arc<dyn Folder>, key_info: &KeyInfo) -> Result<Self, StorageError> {
        let data_key = DataKey::from_base64(&key_info.keys.data_key)?;
        let sync_key = SyncKey::from_base64(&key_info.keys.sync_key)?;
        let repo_id = RepoId::from_sync_key(&sync_key);

        let base = root
            .subfolder("repos")
            .await?
            .subfolder(repo_id.as_str())
            .await?;
        let changes_folder = base.subfolder("changes").await?;
        let data_folder = base.subfolder("data").await?;
        let folder: Arc<dyn Folder> = Arc::new(UnionFolder::new(
            changes_folder.clone(),
            data_folder.clone(),
        ));
        let status_file = StatusFile::new(base, "status.json");

        Ok(RepoPaths {
            data_key,
            sync_key,
            repo_id,
            changes_folder,
            data_folder,
            folder,
            status_file,
        })
    }
}

/// One synchronized repository.
///
/// Owns the layout plus the per-repository round lock, so two sync rounds for
/// the same `Repo` value can never overlap. Rounds for different repositories
/// are independent.
pub struct Repo {
    paths: RepoPaths,
    round_lock: tokio::sync::Mutex<()>,
}

impl Repo {
    pub async fn open(root: Arc<dyn Folder>, key_info: &KeyInfo) -> Result<Self, StorageError> {
        let paths = RepoPaths::build(root, key_info).await?;
        Ok(Repo {
            paths,
            round_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn id(&self) -> &RepoId {
        &self.paths.repo_id
    }

    pub fn data_key(&self) -> &DataKey {
        &self.paths.data_key
    }

    /// The union view consumers read through.
    pub fn folder(&self) -> Arc<dyn Folder> {
        self.paths.folder.clone()
    }

    pub fn paths(&self) -> &RepoPaths {
        &self.paths
    }

    /// Stage a batch of local edits into the changes overlay.
    pub async fn stage(&self, edits: &ChangeSet) -> Result<(), StorageError> {
        save_changes(self.paths.changes_folder.as_ref(), edits).await
    }

    /// Run exactly one reconciliation round.
    pub async fn sync_once(
        &self,
        transport: &dyn SyncTransport,
    ) -> Result<SyncOutcome, SyncError> {
        let _guard = self.round_lock.lock().await;
        sync_once(&self.paths, transport).await
    }

    /// Run reconciliation rounds until the server stops advancing.
    pub async fn sync(&self, transport: &dyn SyncTransport) -> Result<bool, SyncError> {
        let _guard = self.round_lock.lock().await;
        sync_repo(&self.paths, transport).await
    }
}
