//! Status record: the repository's version cursor.
//!
//! A single JSON file holding `lastHash`, the last point in server history
//! this client has fully incorporated. A missing or unreadable record means
//! "never synced" and forces a full pull; corruption here is recovered, not
//! fatal.

use crate::error::StorageError;
use crate::vfs::Folder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
struct StatusRecord {
    #[serde(rename = "lastHash")]
    last_hash: String,
}

pub struct StatusFile {
    folder: Arc<dyn Folder>,
    name: String,
}

impl StatusFile {
    pub fn new(folder: Arc<dyn Folder>, name: impl Into<String>) -> Self {
        StatusFile {
            folder,
            name: name.into(),
        }
    }

    /// Read the cursor. Any failure (missing file, unparsable JSON) is
    /// treated as "no cursor".
    pub async fn last_hash(&self) -> Option<String> {
        let text = match self.folder.get_text(&self.name).await {
            Ok(text) => text,
            Err(StorageError::FileNotFound(_)) => return None,
            Err(e) => {
                tracing::warn!("status record unreadable, forcing full pull: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<StatusRecord>(&text) {
            Ok(record) => Some(record.last_hash),
            Err(e) => {
                tracing::warn!("status record corrupt, forcing full pull: {}", e);
                None
            }
        }
    }

    /// Replace the cursor with a new hash.
    pub async fn save_last_hash(&self, hash: &str) -> Result<(), StorageError> {
        let record = StatusRecord {
            last_hash: hash.to_string(),
        };
        let text = serde_json::to_string(&record)?;
        self.folder.set_text(&self.name, &text).await
    }
}
