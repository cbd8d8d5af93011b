//! Shared test utilities for integration tests
//!
//! Provides a scripted fake sync server, a fault-injecting folder wrapper,
//! and helpers for building repositories over in-memory storage.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use reposync::error::{StorageError, SyncError};
use reposync::repo::{KeyInfo, Repo, RepoKeys};
use reposync::sync::{SyncMethod, SyncReply, SyncRequest, SyncTransport};
use reposync::vfs::{Folder, MemoryFolder};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: SyncMethod,
    pub path: String,
    pub body: Value,
}

/// Scripted in-memory sync server. Replies are consumed in order; once the
/// script is exhausted, further requests get an empty reply.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<SyncReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply built from raw JSON.
    pub fn push_reply(&self, json: &str) {
        let reply: SyncReply = serde_json::from_str(json).unwrap();
        self.replies.lock().push_back(reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SyncTransport for FakeTransport {
    async fn sync_request(
        &self,
        method: SyncMethod,
        path: &str,
        body: &SyncRequest,
    ) -> Result<SyncReply, SyncError> {
        self.requests.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: serde_json::to_value(body).unwrap(),
        });
        Ok(self.replies.lock().pop_front().unwrap_or_default())
    }
}

/// Folder wrapper that fails the next `delete` call, for interrupted-round
/// simulations.
#[derive(Clone)]
pub struct FailNextDelete {
    inner: MemoryFolder,
    armed: Arc<AtomicBool>,
}

impl FailNextDelete {
    pub fn new(inner: MemoryFolder) -> Self {
        FailNextDelete {
            inner,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Folder for FailNextDelete {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        self.inner.list().await
    }

    async fn get_text(&self, name: &str) -> Result<String, StorageError> {
        self.inner.get_text(name).await
    }

    async fn set_text(&self, name: &str, text: &str) -> Result<(), StorageError> {
        self.inner.set_text(name, text).await
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected delete failure",
            )));
        }
        self.inner.delete(name).await
    }

    async fn subfolder(&self, name: &str) -> Result<Arc<dyn Folder>, StorageError> {
        self.inner.subfolder(name).await
    }
}

/// Key info for raw key bytes, base64-encoded the way the wire carries them.
pub fn key_info(data_key: &[u8], sync_key: &[u8]) -> KeyInfo {
    KeyInfo {
        keys: RepoKeys {
            data_key: BASE64.encode(data_key),
            sync_key: BASE64.encode(sync_key),
        },
    }
}

/// Well-known test key pair: dataKey fa57, syncKey f00d.
pub fn test_key_info() -> KeyInfo {
    key_info(&[0xfa, 0x57], &[0xf0, 0x0d])
}

/// Open a repository over a fresh in-memory root.
pub async fn open_memory_repo(info: &KeyInfo) -> (Repo, MemoryFolder) {
    let root = MemoryFolder::new();
    let repo = Repo::open(Arc::new(root.clone()), info).await.unwrap();
    (repo, root)
}
