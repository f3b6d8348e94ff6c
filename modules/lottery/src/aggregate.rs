//! Vote aggregation over a round ledger

use serde::{Deserialize, Serialize};

use crate::ledger::ParticipantEntry;

/// Counts and running sum for one ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub participants: usize,
    pub committed: usize,
    pub revealed: usize,
    pub sum: i64,
}

impl Tally {
    /// Single pass over the entries in stored order
    pub fn compute(entries: &[ParticipantEntry]) -> Self {
        entries.iter().fold(
            Tally {
                participants: entries.len(),
                ..Default::default()
            },
            |mut tally, entry| {
                if entry.is_committed() {
                    tally.committed += 1;
                }
                if let Some(value) = entry.revealed {
                    tally.revealed += 1;
                    tally.sum = tally.sum.saturating_add(value);
                }
                tally
            },
        )
    }
}
