//! Store key layout for lottery rounds
//!
//! Every key for one owner lives under `0x01 ++ owner`, so a setup can clear
//! the owner's round state with a single prefix scan.

use sortilege_core::{Address, Sequence};

/// Namespace tag for lottery state
pub const LOTTERY_PREFIX: &[u8] = &[0x01];

const SEQUENCE_SUFFIX: &[u8] = b"sequence";
const STATUS_SUFFIX: &[u8] = b"status";
const VOTE_SUFFIX: &[u8] = b"vote";
const RESULT_SUFFIX: &[u8] = b"result";
const SETUP_SUFFIX: &[u8] = b"setup";
const ROUND_SUFFIX: &[u8] = b"round";

/// Prefix shared by all of an owner's keys
pub fn round_prefix(owner: &Address) -> Vec<u8> {
    let mut key = LOTTERY_PREFIX.to_vec();
    key.extend_from_slice(owner.as_bytes());
    key
}

fn owner_key(owner: &Address, suffix: &[u8]) -> Vec<u8> {
    let mut key = round_prefix(owner);
    key.extend_from_slice(suffix);
    key
}

pub fn sequence_key(owner: &Address) -> Vec<u8> {
    owner_key(owner, SEQUENCE_SUFFIX)
}

pub fn status_key(owner: &Address) -> Vec<u8> {
    owner_key(owner, STATUS_SUFFIX)
}

pub fn vote_key(owner: &Address) -> Vec<u8> {
    owner_key(owner, VOTE_SUFFIX)
}

pub fn setup_key(owner: &Address) -> Vec<u8> {
    owner_key(owner, SETUP_SUFFIX)
}

pub fn round_info_key(owner: &Address) -> Vec<u8> {
    owner_key(owner, ROUND_SUFFIX)
}

/// Prefix of every result key for an owner
pub fn result_prefix(owner: &Address) -> Vec<u8> {
    owner_key(owner, RESULT_SUFFIX)
}

pub fn result_key(owner: &Address, sequence: Sequence) -> Vec<u8> {
    let mut key = result_prefix(owner);
    key.extend_from_slice(&sequence.to_le_bytes());
    key
}

/// Keys a setup must leave alone: the sequence counter and past results
pub fn survives_setup(owner: &Address, key: &[u8]) -> bool {
    key == sequence_key(owner).as_slice() || key.starts_with(&result_prefix(owner))
}
