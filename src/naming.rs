//! Secure file naming
//!
//! Documents are stored under a content-addressed name: an HMAC-SHA256 of the
//! serialized document bytes keyed by the repository's data key, base58
//! encoded, with a `.json` suffix. The name is a pure function of
//! `(key, content)`, so identical content deduplicates and any edit produces
//! a fresh name. Mapping logical paths onto these names is the caller's job.

use crate::types::DataKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Suffix identifying the JSON document format.
const JSON_SUFFIX: &str = ".json";

/// Compute the secure file name for a document's serialized bytes.
pub fn secure_filename(data_key: &DataKey, data: &[u8]) -> String {
    let digest = hmac_sha256(data_key.as_bytes(), data);
    let mut name = bs58::encode(digest).into_string();
    name.push_str(JSON_SUFFIX);
    name
}

/// HMAC-SHA256 keyed digest.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}
