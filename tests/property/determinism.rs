//! Property-based tests for secure-name determinism guarantees

use proptest::prelude::*;
use reposync::naming::secure_filename;
use reposync::types::{DataKey, RepoId, SyncKey};

/// Names are a pure function of `(key, content)`.
#[test]
fn test_secure_name_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<Vec<u8>>(), any::<Vec<u8>>()), |(key, content)| {
            let data_key = DataKey::from_slice(&key);
            assert_eq!(
                secure_filename(&data_key, &content),
                secure_filename(&data_key, &content)
            );
            Ok(())
        })
        .unwrap();
}

/// Distinct content yields distinct names under the same key.
#[test]
fn test_secure_name_distinctness_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<Vec<u8>>(), any::<Vec<u8>>(), any::<Vec<u8>>()),
            |(key, content1, content2)| {
                let data_key = DataKey::from_slice(&key);
                let name1 = secure_filename(&data_key, &content1);
                let name2 = secure_filename(&data_key, &content2);

                if content1 == content2 {
                    assert_eq!(name1, name2);
                } else {
                    // A keyed-hash collision is theoretically possible but
                    // will not occur over the test corpus.
                    assert_ne!(name1, name2);
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Repo ids are deterministic and never reproduce the sync key bytes.
#[test]
fn test_repo_id_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<Vec<u8>>(), |key_bytes| {
            let sync_key = SyncKey::from_slice(&key_bytes);
            let id1 = RepoId::from_sync_key(&sync_key);
            let id2 = RepoId::from_sync_key(&sync_key);
            assert_eq!(id1, id2);

            if !key_bytes.is_empty() {
                assert_ne!(id1.as_str().as_bytes(), key_bytes.as_slice());
            }
            Ok(())
        })
        .unwrap();
}
