//! Sync protocol driver
//!
//! One reconciliation round between the local overlay layout and the remote
//! store: gather pending changes and the version cursor, make a single
//! round-trip, apply the server's batch to the data baseline, retire the
//! uploaded changes, and advance the cursor. The ordering is the safety
//! property: incoming changes land in the baseline before any outgoing change
//! is retired and before the cursor moves, so an interrupted round can always
//! be retried whole.

pub mod http;

pub use http::HttpSyncTransport;

use crate::error::SyncError;
use crate::repo::{save_changes, ChangeSet, RepoPaths};
use crate::types::RepoId;
use crate::vfs::Folder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Remote store path prefix; the full path is
/// `/api/v2/store/<hex(syncKey)>[/<lastHash>]`.
const STORE_PATH_PREFIX: &str = "/api/v2/store/";

/// Cap for the drain loop, in case a server keeps minting hashes.
const MAX_DRAIN_ROUNDS: usize = 16;

/// Verb for one round: writes push with POST, a pure pull uses GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMethod {
    Get,
    Post,
}

/// Request body. `changes` is omitted entirely on a pure pull.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
}

/// Structured server reply. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncReply {
    #[serde(default)]
    pub changes: Option<ChangeSet>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Result of one reconciliation round.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOutcome {
    /// Whether any incoming changes were applied to the baseline.
    pub changed: bool,
    /// Number of incoming changes applied.
    pub applied: usize,
    /// Whether the server returned a new cursor.
    pub advanced: bool,
}

/// The transport collaborator. Modeled as a trait so the driver is testable
/// against a scripted in-memory server.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn sync_request(
        &self,
        method: SyncMethod,
        path: &str,
        body: &SyncRequest,
    ) -> Result<SyncReply, SyncError>;
}

/// One pending change gathered from the overlay.
struct PendingChange {
    name: String,
    json: Value,
}

/// Run exactly one reconciliation round for the repository.
///
/// Callers must not run two rounds for the same repository concurrently; use
/// [`crate::repo::Repo`] or [`SyncLocks`] to serialize them.
pub async fn sync_once(
    paths: &RepoPaths,
    transport: &dyn SyncTransport,
) -> Result<SyncOutcome, SyncError> {
    // Gather pending changes and the cursor concurrently. A missing or
    // corrupt status record downgrades to a full pull.
    let (our_changes, last_hash) = futures::join!(
        gather_changes(paths.changes_folder.as_ref()),
        paths.status_file.last_hash(),
    );
    let our_changes = our_changes?;

    // Bundle local changes, if any. Later entries for a name win.
    let method = if our_changes.is_empty() {
        SyncMethod::Get
    } else {
        SyncMethod::Post
    };
    let request = SyncRequest {
        changes: if our_changes.is_empty() {
            None
        } else {
            let mut changes = ChangeSet::new();
            for change in &our_changes {
                changes.insert(change.name.clone(), change.json.clone());
            }
            Some(changes)
        },
    };

    // Address by capability, incrementally when a cursor exists.
    let mut path = format!("{}{}", STORE_PATH_PREFIX, paths.sync_key.to_hex());
    if let Some(hash) = &last_hash {
        path.push('/');
        path.push_str(hash);
    }

    tracing::debug!(
        repo = %paths.repo_id,
        method = ?method,
        outgoing = our_changes.len(),
        cursor = last_hash.is_some(),
        "sync round trip"
    );
    let reply = transport.sync_request(method, &path, &request).await?;

    // Apply incoming changes to the data baseline. These are authoritative
    // server history; no merge with local state happens here.
    let applied = match &reply.changes {
        Some(changes) => {
            save_changes(paths.data_folder.as_ref(), changes).await?;
            changes.len()
        }
        None => 0,
    };
    let changed = applied > 0;

    // Retire exactly what was uploaded. Anything staged after the gather
    // stays in the overlay for the next round.
    let retire = our_changes
        .iter()
        .map(|change| paths.changes_folder.delete(&change.name));
    futures::future::try_join_all(retire).await?;

    // Advance the cursor only if the server did.
    let advanced = match &reply.hash {
        Some(hash) => {
            paths.status_file.save_last_hash(hash).await?;
            true
        }
        None => false,
    };

    tracing::debug!(
        repo = %paths.repo_id,
        applied,
        retired = our_changes.len(),
        advanced,
        "sync round complete"
    );
    Ok(SyncOutcome {
        changed,
        applied,
        advanced,
    })
}

/// Run rounds until the server stops advancing.
///
/// A server that pages its replies may return a bounded delta per round; as
/// long as a round both applied changes and advanced the cursor, another
/// round is requested. Returns whether any round applied incoming changes.
pub async fn sync_repo(
    paths: &RepoPaths,
    transport: &dyn SyncTransport,
) -> Result<bool, SyncError> {
    let mut any_changed = false;
    for _ in 0..MAX_DRAIN_ROUNDS {
        let outcome = sync_once(paths, transport).await?;
        any_changed |= outcome.changed;
        if !(outcome.changed && outcome.advanced) {
            return Ok(any_changed);
        }
    }
    tracing::warn!(repo = %paths.repo_id, "sync drain cap reached, stopping");
    Ok(any_changed)
}

/// Read and parse every file in the changes overlay, concurrently, in
/// enumeration order. An unparsable change file is fatal to the round: it
/// means whatever staged the edit is broken, and retiring it would silently
/// drop a local write.
async fn gather_changes(folder: &dyn Folder) -> Result<Vec<PendingChange>, SyncError> {
    let names = folder.list().await.map_err(SyncError::Storage)?;
    let reads = names.into_iter().map(|name| async move {
        let text = folder.get_text(&name).await?;
        let json = serde_json::from_str(&text)
            .map_err(|source| SyncError::MalformedChange { name: name.clone(), source })?;
        Ok::<_, SyncError>(PendingChange { name, json })
    });
    futures::future::try_join_all(reads).await
}

/// Per-repository round locks for callers that manage raw [`RepoPaths`]
/// instead of holding a [`crate::repo::Repo`]. Rounds for the same repository
/// must never overlap; rounds for different repositories are independent.
#[derive(Default)]
pub struct SyncLocks {
    locks: parking_lot::Mutex<HashMap<RepoId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SyncLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding sync rounds for one repository.
    pub fn lock_for(&self, repo_id: &RepoId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(repo_id.clone())
            .or_default()
            .clone()
    }

    /// Run one round while holding the repository's lock.
    pub async fn sync_once(
        &self,
        paths: &RepoPaths,
        transport: &dyn SyncTransport,
    ) -> Result<SyncOutcome, SyncError> {
        let lock = self.lock_for(&paths.repo_id);
        let _guard = lock.lock().await;
        sync_once(paths, transport).await
    }
}
