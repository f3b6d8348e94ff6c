//! Lottery keeper - the round phase state machine
//!
//! Every handler reads through a `&dyn StateProvider` and returns the
//! `StateChange`s it wants applied. A handler that returns an error has
//! produced no changes, so a rejected message leaves the store untouched.

use serde::{Deserialize, Serialize};
use sortilege_core::{
    Address, LotteryConfig, Sequence, SortilegeError, SortilegeResult, StateChange, StateProvider,
};
use sortilege_crypto::commitment;
use sortilege_state::{encode_value, get_decoded};
use sortilege_voter::VoterRegistry;
use tracing::{debug, info, warn};

use crate::aggregate::Tally;
use crate::keys::*;
use crate::ledger::{Phase, RoundInfo, SetupRecord, VoteLedger};
use crate::msgs::{Commit, LotteryMsg, Reveal, SetupRound, StartRound};

/// Snapshot of one owner's round, as seen by queries and the voter actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatus {
    pub owner: Address,
    pub sequence: Sequence,
    pub phase: Phase,
    pub ledger: VoteLedger,
    pub tally: Tally,
    /// Stored result for `sequence`, once the round finished
    pub result: Option<i64>,
}

/// Phase state machine over the round state store
#[derive(Debug, Clone)]
pub struct LotteryKeeper<R: VoterRegistry> {
    config: LotteryConfig,
    registry: R,
}

impl<R: VoterRegistry> LotteryKeeper<R> {
    pub fn new(config: LotteryConfig, registry: R) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Execute a lottery message, returning the changes to apply
    pub fn handle(&self, state: &dyn StateProvider, msg: &LotteryMsg) -> SortilegeResult<Vec<StateChange>> {
        match msg {
            LotteryMsg::Setup(msg) => self.setup_round(state, msg),
            LotteryMsg::StartRound(msg) => self.start_round(state, msg),
            LotteryMsg::Commit(msg) => self.handle_commit(state, msg),
            LotteryMsg::Reveal(msg) => self.handle_reveal(state, msg),
        }
    }

    /// Reset the owner's round configuration
    ///
    /// Clears every per-round key except the sequence counter and stored
    /// results, which leaves the owner in `AwaitingRound`.
    pub fn setup_round(&self, state: &dyn StateProvider, msg: &SetupRound) -> SortilegeResult<Vec<StateChange>> {
        let owner = msg.owner;
        msg.validate_basic(&self.config)?;
        self.expect_sequence(state, &owner, msg.sequence, false)?;

        let mut changes: Vec<StateChange> = state
            .scan_prefix(&round_prefix(&owner))?
            .into_iter()
            .filter(|(key, _)| !survives_setup(&owner, key))
            .map(|(key, _)| StateChange::delete(key))
            .collect();

        let record = SetupRecord {
            participant_names: msg.participant_names.clone(),
            memo: msg.memo.clone(),
        };
        changes.push(StateChange::set(setup_key(&owner), encode_value(&record)?));

        info!(
            "Setup for {} with {} participant names at sequence {}",
            owner,
            record.participant_names.len(),
            msg.sequence
        );
        Ok(changes)
    }

    /// Open a new round over a snapshot of the voter registry
    pub fn start_round(&self, state: &dyn StateProvider, msg: &StartRound) -> SortilegeResult<Vec<StateChange>> {
        let owner = msg.owner;
        msg.validate_basic(&self.config)?;
        self.expect_phase(state, &owner, &[Phase::AwaitingRound])?;
        self.expect_sequence(state, &owner, msg.sequence, true)?;

        let voters = self.registry.voters(state)?;
        let ledger = VoteLedger::from_voters(voters.into_iter().map(|v| v.address));
        if ledger.is_empty() {
            warn!("Round {} for {} starts with no registered voters", msg.sequence, owner);
        }

        let info = RoundInfo {
            magnitude: msg.magnitude,
            memo: msg.memo.clone(),
        };

        info!(
            "Round {} started for {} with {} participants",
            msg.sequence,
            owner,
            ledger.len()
        );

        Ok(vec![
            StateChange::set(vote_key(&owner), encode_value(&ledger)?),
            StateChange::set(round_info_key(&owner), encode_value(&info)?),
            StateChange::set(sequence_key(&owner), encode_value(&msg.sequence)?),
            StateChange::set(status_key(&owner), encode_value(&Phase::AwaitingCommit)?),
        ])
    }

    /// Record a commitment and advance to the reveal phase on quorum
    pub fn handle_commit(&self, state: &dyn StateProvider, msg: &Commit) -> SortilegeResult<Vec<StateChange>> {
        let owner = msg.owner;
        msg.validate_basic(&self.config)?;
        let phase = self.expect_phase(state, &owner, &[Phase::AwaitingCommit, Phase::AwaitingReveal])?;
        self.expect_sequence(state, &owner, msg.sequence, false)?;

        let mut ledger = self.ledger(state, &owner)?;
        let mut changes = Vec::new();

        match ledger.entry_mut(&msg.committer) {
            Some(entry) if !entry.is_committed() => {
                entry.commitment = msg.commitment.clone();
                changes.push(StateChange::set(vote_key(&owner), encode_value(&ledger)?));
                debug!("Commit from {} for {}", msg.committer, owner);
            }
            Some(_) => debug!("Repeated commit from {} for {}", msg.committer, owner),
            None => debug!("Commit from non-participant {} for {}", msg.committer, owner),
        }

        let tally = Tally::compute(ledger.entries());
        if phase == Phase::AwaitingCommit
            && self.config.commit_quorum.is_exceeded(tally.committed, tally.participants)
        {
            info!(
                "Commit quorum reached for {} ({}/{}), awaiting reveals",
                owner, tally.committed, tally.participants
            );
            changes.push(StateChange::set(status_key(&owner), encode_value(&Phase::AwaitingReveal)?));
        }

        Ok(changes)
    }

    /// Verify a reveal and store the result on quorum
    pub fn handle_reveal(&self, state: &dyn StateProvider, msg: &Reveal) -> SortilegeResult<Vec<StateChange>> {
        let owner = msg.owner;
        msg.validate_basic(&self.config)?;
        self.expect_phase(state, &owner, &[Phase::AwaitingReveal])?;
        self.expect_sequence(state, &owner, msg.sequence, false)?;

        let mut ledger = self.ledger(state, &owner)?;
        let mut changes = Vec::new();

        match ledger.entry_mut(&msg.revealer) {
            Some(entry) if entry.is_revealed() => {
                debug!("Repeated reveal from {} for {}", msg.revealer, owner);
            }
            Some(entry) if !entry.is_committed() => {
                debug!("Reveal from {} for {} without a commitment", msg.revealer, owner);
            }
            Some(entry) if commitment::verify(msg.value, &entry.commitment) => {
                entry.revealed = Some(msg.value);
                changes.push(StateChange::set(vote_key(&owner), encode_value(&ledger)?));
                debug!("Reveal from {} for {}", msg.revealer, owner);
            }
            Some(_) => warn!("Reveal from {} for {} does not match its commitment", msg.revealer, owner),
            None => debug!("Reveal from non-participant {} for {}", msg.revealer, owner),
        }

        let tally = Tally::compute(ledger.entries());
        if self.config.reveal_quorum.is_exceeded(tally.revealed, tally.participants) {
            info!(
                "Round {} for {} finished with result {} ({}/{} revealed)",
                msg.sequence, owner, tally.sum, tally.revealed, tally.participants
            );
            changes.push(StateChange::set(result_key(&owner, msg.sequence), encode_value(&tally.sum)?));
            changes.push(StateChange::set(status_key(&owner), encode_value(&Phase::ResultReady)?));
        }

        Ok(changes)
    }

    /// Stored sequence for an owner, zero if unset
    pub fn sequence(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<Sequence> {
        Ok(get_decoded(state, &sequence_key(owner))?.unwrap_or_default())
    }

    /// Current phase for an owner, `AwaitingRound` if unset
    pub fn phase(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<Phase> {
        Ok(get_decoded(state, &status_key(owner))?.unwrap_or_default())
    }

    /// Current ledger for an owner, empty if no round was started
    pub fn ledger(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<VoteLedger> {
        Ok(get_decoded(state, &vote_key(owner))?.unwrap_or_default())
    }

    pub fn setup(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<Option<SetupRecord>> {
        get_decoded(state, &setup_key(owner))
    }

    pub fn round_info(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<Option<RoundInfo>> {
        get_decoded(state, &round_info_key(owner))
    }

    /// Result of a finished round
    pub fn result(
        &self,
        state: &dyn StateProvider,
        owner: &Address,
        sequence: Sequence,
    ) -> SortilegeResult<Option<i64>> {
        get_decoded(state, &result_key(owner, sequence))
    }

    pub fn round_status(&self, state: &dyn StateProvider, owner: &Address) -> SortilegeResult<RoundStatus> {
        let sequence = self.sequence(state, owner)?;
        let ledger = self.ledger(state, owner)?;
        let tally = Tally::compute(ledger.entries());
        Ok(RoundStatus {
            owner: *owner,
            sequence,
            phase: self.phase(state, owner)?,
            result: self.result(state, owner, sequence)?,
            ledger,
            tally,
        })
    }

    fn expect_phase(&self, state: &dyn StateProvider, owner: &Address, allowed: &[Phase]) -> SortilegeResult<Phase> {
        let phase = self.phase(state, owner)?;
        if !allowed.contains(&phase) {
            return Err(SortilegeError::PhaseMismatch {
                current: phase.to_string(),
            });
        }
        Ok(phase)
    }

    fn expect_sequence(
        &self,
        state: &dyn StateProvider,
        owner: &Address,
        got: Sequence,
        next: bool,
    ) -> SortilegeResult<()> {
        let stored = self.sequence(state, owner)?;
        let expected = if next { stored.next() } else { stored };
        if got != expected {
            return Err(SortilegeError::SequenceMismatch {
                expected: expected.0,
                got: got.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortilege_core::StateMutator;
    use sortilege_state::{MemoryStateStore, StateStore};
    use sortilege_voter::{Voter, VoterKeeper};

    const OWNER: Address = Address([0xAA; 32]);

    fn voter(i: u8) -> Address {
        Address([i; 32])
    }

    fn setup_store(voters: &[Address]) -> (MemoryStateStore, LotteryKeeper<VoterKeeper>) {
        let state = MemoryStateStore::new();
        let registry = VoterKeeper::default();
        for address in voters {
            state
                .apply_batch(registry.register_voter(&Voter::new(*address, "")).unwrap())
                .unwrap();
        }
        (state, LotteryKeeper::new(LotteryConfig::default(), registry))
    }

    fn apply(
        state: &MemoryStateStore,
        keeper: &LotteryKeeper<VoterKeeper>,
        msg: LotteryMsg,
    ) -> SortilegeResult<()> {
        let changes = keeper.handle(state, &msg)?;
        state.apply_batch(changes)?;
        Ok(())
    }

    fn setup(seq: u64) -> LotteryMsg {
        LotteryMsg::Setup(SetupRound {
            owner: OWNER,
            sequence: Sequence::new(seq),
            participant_names: vec!["alice".into(), "bob".into()],
            memo: "weekly draw".into(),
        })
    }

    fn start(seq: u64) -> LotteryMsg {
        LotteryMsg::StartRound(StartRound {
            owner: OWNER,
            sequence: Sequence::new(seq),
            magnitude: 100,
            memo: String::new(),
        })
    }

    fn commit(committer: Address, seq: u64, value: i64) -> LotteryMsg {
        LotteryMsg::Commit(Commit {
            owner: OWNER,
            committer,
            sequence: Sequence::new(seq),
            commitment: commitment::commit(value).to_vec(),
        })
    }

    fn reveal(revealer: Address, seq: u64, value: i64) -> LotteryMsg {
        LotteryMsg::Reveal(Reveal {
            owner: OWNER,
            revealer,
            sequence: Sequence::new(seq),
            value,
        })
    }

    fn five_voters() -> Vec<Address> {
        (1..=5).map(voter).collect()
    }

    #[test]
    fn test_five_voter_round() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);

        apply(&state, &keeper, start(1)).unwrap();
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingCommit);
        assert_eq!(keeper.sequence(&state, &OWNER).unwrap(), Sequence::new(1));

        let values = [10, 20, 30, 40, 50];
        for (address, value) in voters.iter().zip(values).take(4) {
            apply(&state, &keeper, commit(*address, 1, value)).unwrap();
        }
        // 4/5 is exactly 80%, not above it
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingCommit);

        apply(&state, &keeper, commit(voters[4], 1, values[4])).unwrap();
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingReveal);

        for (address, value) in voters.iter().zip(values).take(3) {
            apply(&state, &keeper, reveal(*address, 1, value)).unwrap();
        }
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingReveal);
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), None);

        apply(&state, &keeper, reveal(voters[3], 1, values[3])).unwrap();
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::ResultReady);
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), Some(100));

        // The round is closed to further reveals
        assert!(matches!(
            apply(&state, &keeper, reveal(voters[4], 1, values[4])),
            Err(SortilegeError::PhaseMismatch { .. })
        ));
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), Some(100));
    }

    #[test]
    fn test_start_round_checks_phase_then_sequence() {
        let (state, keeper) = setup_store(&five_voters());

        assert!(matches!(
            apply(&state, &keeper, start(0)),
            Err(SortilegeError::SequenceMismatch { expected: 1, got: 0 })
        ));
        assert!(matches!(
            apply(&state, &keeper, start(2)),
            Err(SortilegeError::SequenceMismatch { expected: 1, got: 2 })
        ));

        apply(&state, &keeper, start(1)).unwrap();
        assert!(matches!(
            apply(&state, &keeper, start(2)),
            Err(SortilegeError::PhaseMismatch { .. })
        ));
    }

    #[test]
    fn test_rejections_leave_store_untouched() {
        let (state, keeper) = setup_store(&five_voters());
        apply(&state, &keeper, start(1)).unwrap();
        let root = state.compute_root().unwrap();

        let rejected = vec![
            start(2),
            commit(voter(1), 2, 5),
            commit(voter(1), 0, 5),
            reveal(voter(1), 1, 5),
            setup(0),
            LotteryMsg::StartRound(StartRound {
                owner: OWNER,
                sequence: Sequence::new(2),
                magnitude: 0,
                memo: String::new(),
            }),
        ];
        for msg in rejected {
            assert!(keeper.handle(&state, &msg).is_err(), "{:?} should be rejected", msg);
        }
        assert_eq!(state.compute_root().unwrap(), root);
    }

    #[test]
    fn test_commit_is_written_once() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();

        apply(&state, &keeper, commit(voters[0], 1, 7)).unwrap();
        let root = state.compute_root().unwrap();

        // Same and different commitments both leave the row alone
        assert!(keeper.handle(&state, &commit(voters[0], 1, 7)).unwrap().is_empty());
        apply(&state, &keeper, commit(voters[0], 1, 8)).unwrap();
        assert_eq!(state.compute_root().unwrap(), root);

        let ledger = keeper.ledger(&state, &OWNER).unwrap();
        let entry = ledger.entry(&voters[0]).unwrap();
        assert_eq!(entry.commitment, commitment::commit(7).to_vec());
    }

    #[test]
    fn test_reveal_is_written_once() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        for (i, address) in voters.iter().enumerate() {
            apply(&state, &keeper, commit(*address, 1, i as i64)).unwrap();
        }

        apply(&state, &keeper, reveal(voters[1], 1, 1)).unwrap();
        let root = state.compute_root().unwrap();
        apply(&state, &keeper, reveal(voters[1], 1, 1)).unwrap();
        assert_eq!(state.compute_root().unwrap(), root);
    }

    #[test]
    fn test_mismatched_reveal_ignored() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        for address in &voters {
            apply(&state, &keeper, commit(*address, 1, 42)).unwrap();
        }
        let root = state.compute_root().unwrap();

        apply(&state, &keeper, reveal(voters[0], 1, 43)).unwrap();
        assert_eq!(state.compute_root().unwrap(), root);

        let status = keeper.round_status(&state, &OWNER).unwrap();
        assert_eq!(status.tally.revealed, 0);
        assert_eq!(status.tally.sum, 0);
    }

    #[test]
    fn test_revealed_zero_counts() {
        let voters: Vec<_> = (1..=2).map(voter).collect();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        for address in &voters {
            apply(&state, &keeper, commit(*address, 1, 0)).unwrap();
        }
        apply(&state, &keeper, reveal(voters[0], 1, 0)).unwrap();
        // 1/2 is not above 75%
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingReveal);

        apply(&state, &keeper, reveal(voters[1], 1, 0)).unwrap();
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::ResultReady);
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), Some(0));
    }

    #[test]
    fn test_non_participant_is_noop() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        let root = state.compute_root().unwrap();

        apply(&state, &keeper, commit(voter(99), 1, 5)).unwrap();
        assert_eq!(state.compute_root().unwrap(), root);
    }

    #[test]
    fn test_late_commit_during_reveal() {
        let voters: Vec<_> = (1..=10).map(voter).collect();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        for address in voters.iter().take(9) {
            apply(&state, &keeper, commit(*address, 1, 1)).unwrap();
        }
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingReveal);

        apply(&state, &keeper, commit(voters[9], 1, 1)).unwrap();
        let status = keeper.round_status(&state, &OWNER).unwrap();
        assert_eq!(status.phase, Phase::AwaitingReveal);
        assert_eq!(status.tally.committed, 10);
    }

    #[test]
    fn test_reveal_without_commitment_is_noop() {
        let voters: Vec<_> = (1..=10).map(voter).collect();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();
        for address in voters.iter().take(9) {
            apply(&state, &keeper, commit(*address, 1, 1)).unwrap();
        }
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingReveal);
        let root = state.compute_root().unwrap();

        // Outside the ledger, then a participant that never committed
        for msg in [reveal(voter(99), 1, 1), reveal(voters[9], 1, 1)] {
            assert!(keeper.handle(&state, &msg).unwrap().is_empty());
        }
        assert_eq!(state.compute_root().unwrap(), root);

        let status = keeper.round_status(&state, &OWNER).unwrap();
        assert_eq!(status.phase, Phase::AwaitingReveal);
        assert_eq!(status.tally.committed, 9);
        assert_eq!(status.tally.revealed, 0);
        assert_eq!(status.tally.sum, 0);
        assert!(status.ledger.entry(&voters[9]).unwrap().revealed.is_none());
    }

    #[test]
    fn test_registry_snapshot_at_start() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        apply(&state, &keeper, start(1)).unwrap();

        // Later registry changes do not touch the running round
        state
            .apply_batch(keeper.registry().register_voter(&Voter::new(voter(42), "")).unwrap())
            .unwrap();
        state.apply_batch(keeper.registry().revoke_voter(&voters[0])).unwrap();

        let ledger = keeper.ledger(&state, &OWNER).unwrap();
        let addresses: Vec<_> = ledger.entries().iter().map(|e| e.voter).collect();
        assert_eq!(addresses, voters);
    }

    #[test]
    fn test_setup_keeps_sequence_and_results() {
        let voters: Vec<_> = (1..=2).map(voter).collect();
        let (state, keeper) = setup_store(&voters);

        apply(&state, &keeper, setup(0)).unwrap();
        assert_eq!(keeper.setup(&state, &OWNER).unwrap().unwrap().memo, "weekly draw");

        apply(&state, &keeper, start(1)).unwrap();
        for (address, value) in voters.iter().zip([3, 4]) {
            apply(&state, &keeper, commit(*address, 1, value)).unwrap();
        }
        for (address, value) in voters.iter().zip([3, 4]) {
            apply(&state, &keeper, reveal(*address, 1, value)).unwrap();
        }
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::ResultReady);

        // Setup needs the current sequence, not the next one
        assert!(matches!(
            apply(&state, &keeper, setup(2)),
            Err(SortilegeError::SequenceMismatch { expected: 1, got: 2 })
        ));
        apply(&state, &keeper, setup(1)).unwrap();

        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingRound);
        assert_eq!(keeper.sequence(&state, &OWNER).unwrap(), Sequence::new(1));
        assert!(keeper.ledger(&state, &OWNER).unwrap().is_empty());
        assert!(keeper.round_info(&state, &OWNER).unwrap().is_none());
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), Some(7));

        apply(&state, &keeper, start(2)).unwrap();
        let status = keeper.round_status(&state, &OWNER).unwrap();
        assert_eq!(status.sequence, Sequence::new(2));
        assert_eq!(status.phase, Phase::AwaitingCommit);
        assert_eq!(status.result, None);
        assert_eq!(keeper.result(&state, &OWNER, Sequence::new(1)).unwrap(), Some(7));
    }

    #[test]
    fn test_owners_are_independent() {
        let voters = five_voters();
        let (state, keeper) = setup_store(&voters);
        let other = Address([0xBB; 32]);

        apply(&state, &keeper, start(1)).unwrap();
        assert_eq!(keeper.phase(&state, &other).unwrap(), Phase::AwaitingRound);
        assert_eq!(keeper.sequence(&state, &other).unwrap(), Sequence::ZERO);

        let other_start = LotteryMsg::StartRound(StartRound {
            owner: other,
            sequence: Sequence::new(1),
            magnitude: 5,
            memo: "other".into(),
        });
        apply(&state, &keeper, other_start).unwrap();
        apply(&state, &keeper, setup(1)).unwrap();

        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingRound);
        assert_eq!(keeper.phase(&state, &other).unwrap(), Phase::AwaitingCommit);
        assert_eq!(keeper.round_info(&state, &other).unwrap().unwrap().magnitude, 5);
    }

    #[test]
    fn test_empty_registry_round_stalls() {
        let (state, keeper) = setup_store(&[]);
        apply(&state, &keeper, start(1)).unwrap();
        apply(&state, &keeper, commit(voter(1), 1, 1)).unwrap();
        assert_eq!(keeper.phase(&state, &OWNER).unwrap(), Phase::AwaitingCommit);
    }
}
