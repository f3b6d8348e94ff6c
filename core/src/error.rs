//! Error types for sortilege

use thiserror::Error;

/// Main error type for sortilege
#[derive(Error, Debug)]
pub enum SortilegeError {
    // ============ Round Errors ============
    #[error("Sequence mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: u64, got: u64 },

    #[error("Message not accepted in phase {current}")]
    PhaseMismatch { current: String },

    #[error("Participant list must not be empty")]
    EmptyParticipantList,

    #[error("Invalid magnitude {got}: must be in (0, {max}]")]
    InvalidMagnitude { got: i64, max: i64 },

    #[error("Memo too long: maximum {max} bytes, got {got}")]
    MemoTooLong { max: usize, got: usize },

    #[error("Value {got} out of range [0, {max}]")]
    ValueOutOfRange { got: i64, max: i64 },

    #[error("Commitment hash must not be empty")]
    EmptyCommitment,

    // ============ Message Errors ============
    #[error("Unrecognized message type: {0}")]
    UnrecognizedMessage(String),

    #[error("Signer mismatch: message signed by {expected}, delivered by {got}")]
    SignerMismatch { expected: String, got: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // ============ Registry Errors ============
    #[error("Voter not found: {0}")]
    VoterNotFound(String),

    // ============ State Errors ============
    #[error("State corruption detected: {0}")]
    StateCorruption(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization failed: {0}")]
    SerializationError(String),

    #[error("Deserialization failed: {0}")]
    DeserializationError(String),

    // ============ Configuration Errors ============
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ============ General Errors ============
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SortilegeError {
    /// Whether the error is a permanent rejection of the message itself, as
    /// opposed to a failure of the surrounding machinery
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SortilegeError::SequenceMismatch { .. }
                | SortilegeError::PhaseMismatch { .. }
                | SortilegeError::EmptyParticipantList
                | SortilegeError::InvalidMagnitude { .. }
                | SortilegeError::MemoTooLong { .. }
                | SortilegeError::ValueOutOfRange { .. }
                | SortilegeError::EmptyCommitment
                | SortilegeError::UnrecognizedMessage(_)
                | SortilegeError::SignerMismatch { .. }
                | SortilegeError::InvalidAddress(_)
        )
    }
}

impl From<std::io::Error> for SortilegeError {
    fn from(err: std::io::Error) -> Self {
        SortilegeError::StorageError(err.to_string())
    }
}

impl From<bincode::Error> for SortilegeError {
    fn from(err: bincode::Error) -> Self {
        SortilegeError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for SortilegeError {
    fn from(err: serde_json::Error) -> Self {
        SortilegeError::SerializationError(err.to_string())
    }
}
