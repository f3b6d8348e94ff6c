//! Core traits defining sortilege interfaces
//!
//! Storage is injected into every keeper operation through these traits.
//! All of them are synchronous: a message is applied to completion before
//! the next one is looked at.

use crate::types::*;
use serde::{Deserialize, Serialize};

/// Result type for sortilege operations
pub type SortilegeResult<T> = Result<T, crate::error::SortilegeError>;

/// Read access to the key-value state
pub trait StateProvider: Send + Sync {
    /// Get the current state version
    fn version(&self) -> StateVersion;

    /// Get a value by key
    fn get(&self, key: &[u8]) -> SortilegeResult<Option<Vec<u8>>>;

    /// Check if a key exists
    fn exists(&self, key: &[u8]) -> SortilegeResult<bool>;

    /// All entries whose key starts with `prefix`, in ascending key order
    fn scan_prefix(&self, prefix: &[u8]) -> SortilegeResult<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// Write access to the key-value state
pub trait StateMutator: StateProvider {
    /// Set a value
    fn set(&self, key: &[u8], value: &[u8]) -> SortilegeResult<()>;

    /// Delete a key
    fn delete(&self, key: &[u8]) -> SortilegeResult<()>;

    /// Apply a batch of changes atomically
    fn apply_batch(&self, changes: Vec<StateChange>) -> SortilegeResult<StateVersion>;
}

/// State change operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl StateChange {
    pub fn set(key: Vec<u8>, value: Vec<u8>) -> Self {
        StateChange::Set { key, value }
    }

    pub fn delete(key: Vec<u8>) -> Self {
        StateChange::Delete { key }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            StateChange::Set { key, .. } | StateChange::Delete { key } => key,
        }
    }
}
