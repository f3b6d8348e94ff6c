//! Commit-reveal commitments
//!
//! A commitment is the BLAKE3 digest of a domain tag followed by the
//! little-endian encoding of the committed `i64`. Participants publish the
//! digest first and the value later; the value is accepted only if it
//! hashes back to the stored digest.

use sortilege_core::Hash;

use crate::hashing::hash_multiple;

const COMMIT_DOMAIN: &[u8] = b"SORTILEGE_COMMIT:";

/// Canonical byte encoding of a committed value
pub fn commitment_bytes(value: i64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Commit to a value
pub fn commit(value: i64) -> Hash {
    hash_multiple(&[COMMIT_DOMAIN, &commitment_bytes(value)])
}

/// Check a revealed value against a stored commitment
///
/// Stored commitments are arbitrary bytes supplied by the committer, so a
/// digest of the wrong length simply never verifies.
pub fn verify(value: i64, digest: &[u8]) -> bool {
    commit(value).as_bytes().as_slice() == digest
}
