//! Change staging
//!
//! Writes a batch of edits into a folder, one independent operation per
//! entry. A JSON value is serialized and written under its name; a null value
//! is a tombstone and deletes the file (absent is a no-op). Entries are
//! dispatched concurrently and one entry's failure neither blocks nor rolls
//! back the rest; all operations settle before the first error is reported.
//!
//! The same routine serves two callers: staging local edits into the changes
//! overlay, and applying an incoming server batch onto the data baseline.

use crate::error::StorageError;
use crate::vfs::Folder;
use serde_json::Value;
use std::collections::BTreeMap;

/// Batch of named edits. `Value::Null` marks a deletion.
pub type ChangeSet = BTreeMap<String, Value>;

pub async fn save_changes(folder: &dyn Folder, changes: &ChangeSet) -> Result<(), StorageError> {
    let ops = changes.iter().map(|(name, value)| async move {
        if value.is_null() {
            folder.delete(name).await
        } else {
            let text = serde_json::to_string(value)?;
            folder.set_text(name, &text).await
        }
    });

    let mut outcome = Ok(());
    for result in futures::future::join_all(ops).await {
        if let Err(e) = result {
            tracing::warn!("change write failed: {}", e);
            if outcome.is_ok() {
                outcome = Err(e);
            }
        }
    }
    outcome
}
