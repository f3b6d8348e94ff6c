//! Core state store traits and types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sortilege_core::{
    Hash, SortilegeError, SortilegeResult, StateMutator, StateProvider, StateRoot, StateVersion,
};
use sortilege_crypto::hashing::{hash_multiple, merkle_root};
use std::collections::BTreeMap;

/// Encode a stored value
pub fn encode_value<T: Serialize>(value: &T) -> SortilegeResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| SortilegeError::SerializationError(e.to_string()))
}

/// Decode a stored value
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> SortilegeResult<T> {
    bincode::deserialize(bytes).map_err(|e| SortilegeError::DeserializationError(e.to_string()))
}

/// Read and decode a value, `None` if the key is absent
pub fn get_decoded<T: DeserializeOwned>(
    state: &dyn StateProvider,
    key: &[u8],
) -> SortilegeResult<Option<T>> {
    match state.get(key)? {
        Some(bytes) => Ok(Some(decode_value(&bytes)?)),
        None => Ok(None),
    }
}

/// State entry for merkle tree computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl StateEntry {
    pub fn hash(&self) -> Hash {
        // Length-prefix the key so (ab, c) and (a, bc) hash differently
        let key_len = (self.key.len() as u64).to_le_bytes();
        hash_multiple(&[&key_len, &self.key, &self.value])
    }
}

/// Compute state root from entries
pub fn compute_state_root(entries: &[StateEntry]) -> StateRoot {
    if entries.is_empty() {
        return Hash::ZERO;
    }

    // Sort entries by key for deterministic ordering
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let leaves: Vec<Hash> = sorted.iter().map(|e| e.hash()).collect();

    merkle_root(&leaves)
}

/// Number of per-batch diffs a store keeps
pub const HISTORY_RETENTION: u64 = 1024;

/// Fail when `from_version` is older than the retained history
pub fn check_retained(from_version: StateVersion, current_version: StateVersion) -> SortilegeResult<()> {
    if current_version.0.saturating_sub(from_version.0) > HISTORY_RETENTION {
        return Err(SortilegeError::StorageError(format!(
            "history before {} has been pruned (current {})",
            from_version, current_version
        )));
    }
    Ok(())
}

/// State diff for synchronization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDiff {
    pub from_version: StateVersion,
    pub to_version: StateVersion,
    pub added: BTreeMap<Vec<u8>, Vec<u8>>,
    pub removed: Vec<Vec<u8>>,
}

impl StateDiff {
    pub fn new(from_version: StateVersion, to_version: StateVersion) -> Self {
        Self {
            from_version,
            to_version,
            added: BTreeMap::new(),
            removed: Vec::new(),
        }
    }

    pub fn add(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.removed.retain(|k| k != &key);
        self.added.insert(key, value);
    }

    pub fn remove(&mut self, key: Vec<u8>) {
        self.added.remove(&key);
        self.removed.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Abstract state store interface
pub trait StateStore: StateMutator {
    /// Get all entries for state root computation
    fn all_entries(&self) -> SortilegeResult<Vec<StateEntry>>;

    /// Compute current state root
    fn compute_root(&self) -> SortilegeResult<StateRoot> {
        let entries = self.all_entries()?;
        Ok(compute_state_root(&entries))
    }

    /// Get diff between versions
    fn diff(&self, from_version: StateVersion) -> SortilegeResult<StateDiff>;
}
