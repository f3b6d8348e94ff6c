//! Persistent state store using sled database

use parking_lot::RwLock;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use sortilege_core::{
    SortilegeError, SortilegeResult, StateChange, StateMutator, StateProvider, StateVersion,
};
use std::path::Path;
use tracing::debug;

use crate::memory::MemoryStateStore;
use crate::store::{
    check_retained, decode_value, encode_value, StateDiff, StateEntry, StateStore, HISTORY_RETENTION,
};

const STATE_TREE: &str = "state";
const META_TREE: &str = "meta";
const HISTORY_TREE: &str = "history";
const VERSION_KEY: &[u8] = b"version";

fn storage_err(e: sled::Error) -> SortilegeError {
    SortilegeError::StorageError(e.to_string())
}

fn transaction_err(e: TransactionError<()>) -> SortilegeError {
    match e {
        TransactionError::Storage(e) => storage_err(e),
        TransactionError::Abort(()) => SortilegeError::StorageError("batch transaction aborted".into()),
    }
}

/// Persistent state store backed by sled database
pub struct PersistentStateStore {
    db: Db,
    state: Tree,
    meta: Tree,
    history: Tree,
    version: RwLock<StateVersion>,
}

impl PersistentStateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> SortilegeResult<Self> {
        let db = sled::open(path).map_err(storage_err)?;

        let state = db.open_tree(STATE_TREE).map_err(storage_err)?;
        let meta = db.open_tree(META_TREE).map_err(storage_err)?;
        let history = db.open_tree(HISTORY_TREE).map_err(storage_err)?;

        // Load version from disk or start at 0
        let version = match meta.get(VERSION_KEY).map_err(storage_err)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    SortilegeError::StateCorruption("version record is not 8 bytes".into())
                })?;
                StateVersion::new(u64::from_le_bytes(raw))
            }
            None => StateVersion::new(0),
        };

        debug!("Opened persistent store at {}", version);

        Ok(Self {
            db,
            state,
            meta,
            history,
            version: RwLock::new(version),
        })
    }

    /// Copy the current contents into a memory store
    pub fn snapshot(&self) -> SortilegeResult<MemoryStateStore> {
        let data: Vec<(Vec<u8>, Vec<u8>)> = self
            .all_entries()?
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect();
        Ok(MemoryStateStore::with_data(data))
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> SortilegeResult<()> {
        self.db.flush().map_err(storage_err)?;
        Ok(())
    }
}

impl StateProvider for PersistentStateStore {
    fn version(&self) -> StateVersion {
        *self.version.read()
    }

    fn get(&self, key: &[u8]) -> SortilegeResult<Option<Vec<u8>>> {
        self.state
            .get(key)
            .map(|opt| opt.map(|v| v.to_vec()))
            .map_err(storage_err)
    }

    fn exists(&self, key: &[u8]) -> SortilegeResult<bool> {
        self.state.contains_key(key).map_err(storage_err)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> SortilegeResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.state
            .scan_prefix(prefix)
            .map(|result| result.map(|(key, value)| (key.to_vec(), value.to_vec())))
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)
    }
}

impl StateMutator for PersistentStateStore {
    fn set(&self, key: &[u8], value: &[u8]) -> SortilegeResult<()> {
        self.state.insert(key, value).map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> SortilegeResult<()> {
        self.state.remove(key).map_err(storage_err)?;
        Ok(())
    }

    fn apply_batch(&self, changes: Vec<StateChange>) -> SortilegeResult<StateVersion> {
        let mut version = self.version.write();
        let old_version = *version;
        let new_version = old_version.next();

        let mut diff = StateDiff::new(old_version, new_version);
        for change in &changes {
            match change {
                StateChange::Set { key, value } => diff.add(key.clone(), value.clone()),
                StateChange::Delete { key } => diff.remove(key.clone()),
            }
        }
        let diff_bytes = encode_value(&diff)?;
        let pruned = old_version.0.checked_sub(HISTORY_RETENTION);

        // State, version and history land together or not at all
        (&self.state, &self.meta, &self.history)
            .transaction(|(state, meta, history)| {
                for change in &changes {
                    match change {
                        StateChange::Set { key, value } => {
                            state.insert(key.as_slice(), value.as_slice())?;
                        }
                        StateChange::Delete { key } => {
                            state.remove(key.as_slice())?;
                        }
                    }
                }
                meta.insert(VERSION_KEY, new_version.0.to_le_bytes().to_vec())?;
                // Big-endian keys keep the history tree in version order
                history.insert(old_version.0.to_be_bytes().to_vec(), diff_bytes.as_slice())?;
                if let Some(pruned) = pruned {
                    history.remove(pruned.to_be_bytes().to_vec())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(transaction_err)?;

        self.db.flush().map_err(storage_err)?;

        *version = new_version;

        Ok(new_version)
    }
}

impl StateStore for PersistentStateStore {
    fn all_entries(&self) -> SortilegeResult<Vec<StateEntry>> {
        self.state
            .iter()
            .map(|result| {
                result.map(|(key, value)| StateEntry {
                    key: key.to_vec(),
                    value: value.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)
    }

    fn diff(&self, from_version: StateVersion) -> SortilegeResult<StateDiff> {
        let current_version = *self.version.read();
        check_retained(from_version, current_version)?;
        let mut combined = StateDiff::new(from_version, current_version);

        for result in self.history.range(from_version.0.to_be_bytes()..) {
            let (_, diff_bytes) = result.map_err(storage_err)?;
            let d: StateDiff = decode_value(&diff_bytes)?;

            for (key, value) in d.added {
                combined.add(key, value);
            }
            for key in d.removed {
                combined.remove(key);
            }
        }

        Ok(combined)
    }
}
