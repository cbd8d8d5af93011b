//! Key material and identifier types for the repository sync engine.

use crate::error::StorageError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;

/// 256-bit digest produced by the hashing primitives.
pub type Hash = [u8; 32];

/// Symmetric content-encryption key. Inside this crate it is only used to
/// derive content-addressed file names; encrypting document bytes happens in
/// the layer above.
#[derive(Clone, PartialEq, Eq)]
pub struct DataKey(Vec<u8>);

/// Repository identifier/capability on the remote store. Doubles as a lookup
/// secret, so it must never appear raw in the on-disk layout.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncKey(Vec<u8>);

impl DataKey {
    pub fn from_slice(bytes: &[u8]) -> Self {
        DataKey(bytes.to_vec())
    }

    /// Decode a base64-encoded key, as carried in key info records.
    pub fn from_base64(encoded: &str) -> Result<Self, StorageError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StorageError::InvalidKey(format!("dataKey: {}", e)))?;
        Ok(DataKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl SyncKey {
    pub fn from_slice(bytes: &[u8]) -> Self {
        SyncKey(bytes.to_vec())
    }

    /// Decode a base64-encoded key, as carried in key info records.
    pub fn from_base64(encoded: &str) -> Result<Self, StorageError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StorageError::InvalidKey(format!("syncKey: {}", e)))?;
        Ok(SyncKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding used in the remote store path.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

// Keys are secrets; keep them out of debug output.
impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey([{} bytes])", self.0.len())
    }
}

impl fmt::Debug for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncKey([{} bytes])", self.0.len())
    }
}

/// Local folder name for one repository.
///
/// Derived as base58 of a double SHA-256 of the sync key, so the on-disk
/// layout never leaks the raw capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId(String);

impl RepoId {
    pub fn from_sync_key(sync_key: &SyncKey) -> Self {
        let inner: Hash = Sha256::digest(sync_key.as_bytes()).into();
        let outer: Hash = Sha256::digest(inner).into();
        RepoId(bs58::encode(outer).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
