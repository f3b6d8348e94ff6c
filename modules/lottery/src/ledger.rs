//! Round data model: phase, participant ledger and setup records

use serde::{Deserialize, Serialize};
use sortilege_core::Address;
use std::fmt;

/// Round phase, advancing strictly forward within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// No round running; a start-round message is expected
    #[default]
    AwaitingRound,
    /// Collecting commitments
    AwaitingCommit,
    /// Commit quorum reached; collecting reveals
    AwaitingReveal,
    /// Reveal quorum reached; the result is stored
    ResultReady,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingRound => "awaiting-round",
            Phase::AwaitingCommit => "awaiting-commit",
            Phase::AwaitingReveal => "awaiting-reveal",
            Phase::ResultReady => "result-ready",
        };
        f.write_str(name)
    }
}

/// One voter's row in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub voter: Address,
    /// Empty until the voter commits
    pub commitment: Vec<u8>,
    /// `None` until a matching reveal arrives
    pub revealed: Option<i64>,
}

impl ParticipantEntry {
    pub fn new(voter: Address) -> Self {
        Self {
            voter,
            commitment: Vec::new(),
            revealed: None,
        }
    }

    pub fn is_committed(&self) -> bool {
        !self.commitment.is_empty()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.is_some()
    }

    /// Revealed value, zero while unrevealed
    pub fn value(&self) -> i64 {
        self.revealed.unwrap_or(0)
    }
}

/// Participant rows of a round, sorted by voter address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoteLedger {
    entries: Vec<ParticipantEntry>,
}

impl VoteLedger {
    /// Fresh ledger with one empty row per voter
    pub fn from_voters(voters: impl IntoIterator<Item = Address>) -> Self {
        let mut entries: Vec<ParticipantEntry> = voters.into_iter().map(ParticipantEntry::new).collect();
        entries.sort_by(|a, b| a.voter.cmp(&b.voter));
        entries.dedup_by(|a, b| a.voter == b.voter);
        Self { entries }
    }

    pub fn entries(&self) -> &[ParticipantEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, voter: &Address) -> Option<&ParticipantEntry> {
        self.position(voter).map(|i| &self.entries[i])
    }

    pub fn entry_mut(&mut self, voter: &Address) -> Option<&mut ParticipantEntry> {
        self.position(voter).map(move |i| &mut self.entries[i])
    }

    fn position(&self, voter: &Address) -> Option<usize> {
        self.entries.binary_search_by(|e| e.voter.cmp(voter)).ok()
    }
}

/// Configuration stored by a setup message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub participant_names: Vec<String>,
    pub memo: String,
}

/// Parameters of the running round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub magnitude: i64,
    pub memo: String,
}
