//! Advisory lock identifiers
//!
//! The store's advisory locks are keyed by a signed 64-bit integer. Cache
//! coordination needs every cooperating process to derive the same id from
//! the cache prefix, so the id is a stable hash of the name: the first 14 hex
//! digits (56 bits) of SHA-256, which always fits in a positive `i64`.

use sha2::{Digest, Sha256};

const LOCK_ID_HEX_DIGITS: usize = 14;

/// Derive the advisory lock id for a lock name.
///
/// Deterministic across processes and runs; distinct names collide only with
/// the usual truncated-hash probability.
pub fn lock_id(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let hex = hex::encode(digest);
    // 14 hex digits are 56 bits, always within i64 range
    i64::from_str_radix(&hex[..LOCK_ID_HEX_DIGITS], 16).expect("14 hex digits fit in i64")
}
