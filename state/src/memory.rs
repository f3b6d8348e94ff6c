//! In-memory state store
//!
//! Batches are serialized on the version lock; readers may run alongside.
//! Locks are always taken version first, then history.

use dashmap::DashMap;
use parking_lot::RwLock;
use sortilege_core::{SortilegeResult, StateChange, StateMutator, StateProvider, StateVersion};
use std::collections::VecDeque;

use crate::store::{check_retained, StateDiff, StateEntry, StateStore, HISTORY_RETENTION};

/// In-memory state store
pub struct MemoryStateStore {
    data: DashMap<Vec<u8>, Vec<u8>>,
    version: RwLock<StateVersion>,
    history: RwLock<VecDeque<StateDiff>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            version: RwLock::new(StateVersion::new(0)),
            history: RwLock::new(VecDeque::new()),
        }
    }

    pub fn with_data(data: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        let store = Self::new();
        for (key, value) in data {
            store.data.insert(key, value);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateProvider for MemoryStateStore {
    fn version(&self) -> StateVersion {
        *self.version.read()
    }

    fn get(&self, key: &[u8]) -> SortilegeResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    fn exists(&self, key: &[u8]) -> SortilegeResult<bool> {
        Ok(self.data.contains_key(key))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> SortilegeResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

impl StateMutator for MemoryStateStore {
    fn set(&self, key: &[u8], value: &[u8]) -> SortilegeResult<()> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> SortilegeResult<()> {
        self.data.remove(key);
        Ok(())
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> SortilegeResult<StateVersion> {
        // Held for the whole batch so concurrent batches serialize
        let mut version = self.version.write();
        let old_version = *version;
        let new_version = old_version.next();
        let mut diff = StateDiff::new(old_version, new_version);

        for change in changes {
            match change {
                StateChange::Set { key, value } => {
                    diff.add(key.clone(), value.clone());
                    self.data.insert(key, value);
                }
                StateChange::Delete { key } => {
                    diff.remove(key.clone());
                    self.data.remove(&key);
                }
            }
        }

        let mut history = self.history.write();
        history.push_back(diff);
        while history.len() as u64 > HISTORY_RETENTION {
            history.pop_front();
        }
        *version = new_version;

        Ok(new_version)
    }
}

impl StateStore for MemoryStateStore {
    fn all_entries(&self) -> SortilegeResult<Vec<StateEntry>> {
        let entries: Vec<StateEntry> = self
            .data
            .iter()
            .map(|entry| StateEntry {
                key: entry.key().clone(),
                value: entry.value().clone(),
            })
            .collect();
        Ok(entries)
    }

    fn diff(&self, from_version: StateVersion) -> SortilegeResult<StateDiff> {
        let version = self.version.read();
        let current_version = *version;
        check_retained(from_version, current_version)?;
        let history = self.history.read();
        drop(version);

        let mut combined = StateDiff::new(from_version, current_version);

        for diff in history.iter() {
            if diff.from_version.0 >= from_version.0 {
                for (key, value) in &diff.added {
                    combined.add(key.clone(), value.clone());
                }
                for key in &diff.removed {
                    combined.remove(key.clone());
                }
            }
        }

        Ok(combined)
    }
}
