//! Automated voter
//!
//! A `VoterActor` follows one owner's rounds on behalf of one voter. It polls
//! the round status, commits to a fresh random value while commits are being
//! collected and reveals that value once the round moves to the reveal phase.

use async_trait::async_trait;
use rand::Rng;
use sortilege_core::{ActorConfig, Address, Sequence, SortilegeResult};
use sortilege_crypto::commitment;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keeper::RoundStatus;
use crate::ledger::Phase;
use crate::msgs::{Commit, LotteryMsg, Reveal};

/// Read side the actor polls
#[async_trait]
pub trait RoundQuery: Send + Sync {
    async fn round_status(&self, owner: &Address) -> SortilegeResult<RoundStatus>;
}

/// Write side the actor submits its messages to
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn submit(&self, sender: Address, msg: LotteryMsg) -> SortilegeResult<()>;
}

/// Committed value held until it is revealed (zeroizes on drop)
#[derive(Zeroize, ZeroizeOnDrop)]
struct Secret {
    #[zeroize(skip)]
    sequence: Sequence,
    value: i64,
}

/// Drives one voter's participation in one owner's rounds
pub struct VoterActor {
    voter: Address,
    owner: Address,
    max_value: i64,
    secret: Option<Secret>,
}

impl VoterActor {
    pub fn new(voter: Address, owner: Address) -> Self {
        Self {
            voter,
            owner,
            max_value: 1 << 32,
            secret: None,
        }
    }

    /// Upper bound (inclusive) for drawn values
    pub fn with_max_value(mut self, max_value: i64) -> Self {
        self.max_value = max_value;
        self
    }

    pub fn voter(&self) -> Address {
        self.voter
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Decide the next message for a round status, if any
    pub fn step(&mut self, status: &RoundStatus) -> Option<LotteryMsg> {
        self.step_with_rng(status, &mut rand::thread_rng())
    }

    pub fn step_with_rng<G: Rng + ?Sized>(&mut self, status: &RoundStatus, rng: &mut G) -> Option<LotteryMsg> {
        if status.owner != self.owner {
            return None;
        }
        if self.secret.as_ref().is_some_and(|s| s.sequence != status.sequence) {
            // Stale round
            self.secret = None;
        }

        let entry = status.ledger.entry(&self.voter)?;
        match status.phase {
            Phase::AwaitingCommit if !entry.is_committed() => {
                let max_value = self.max_value;
                let secret = self.secret.get_or_insert_with(|| Secret {
                    sequence: status.sequence,
                    value: rng.gen_range(0..=max_value),
                });
                Some(LotteryMsg::Commit(Commit {
                    owner: self.owner,
                    committer: self.voter,
                    sequence: status.sequence,
                    commitment: commitment::commit(secret.value).to_vec(),
                }))
            }
            Phase::AwaitingReveal if entry.is_committed() && !entry.is_revealed() => {
                let secret = self.secret.as_ref()?;
                if !commitment::verify(secret.value, &entry.commitment) {
                    warn!("Voter {} holds no secret for its commitment in round {}", self.voter, status.sequence);
                    return None;
                }
                Some(LotteryMsg::Reveal(Reveal {
                    owner: self.owner,
                    revealer: self.voter,
                    sequence: status.sequence,
                    value: secret.value,
                }))
            }
            Phase::ResultReady => {
                self.secret = None;
                None
            }
            _ => None,
        }
    }

    /// Poll once and submit at most one message; returns whether one was sent
    pub async fn poll_once<Q, S>(&mut self, query: &Q, sink: &S) -> SortilegeResult<bool>
    where
        Q: RoundQuery + ?Sized,
        S: MessageSink + ?Sized,
    {
        let status = query.round_status(&self.owner).await?;
        match self.step(&status) {
            Some(msg) => {
                debug!("Voter {} submitting {:?} for round {}", self.voter, msg, status.sequence);
                sink.submit(self.voter, msg).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Poll on an interval until `shutdown` fires
    pub async fn run<Q, S>(
        mut self,
        query: Arc<Q>,
        sink: Arc<S>,
        config: ActorConfig,
        mut shutdown: watch::Receiver<bool>,
    ) where
        Q: RoundQuery + ?Sized,
        S: MessageSink + ?Sized,
    {
        info!(
            "Voter actor for {} following {} (interval: {}ms)",
            self.voter, self.owner, config.poll_interval_ms
        );

        let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.poll_once(query.as_ref(), sink.as_ref()).await {
                warn!("Voter {} poll failed: {}", self.voter, e);
            }
        }

        info!("Voter actor for {} stopped", self.voter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Tally;
    use crate::keeper::LotteryKeeper;
    use crate::ledger::VoteLedger;
    use crate::msgs::StartRound;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sortilege_core::{LotteryConfig, SortilegeError, StateMutator};
    use sortilege_state::MemoryStateStore;
    use sortilege_voter::{Voter, VoterKeeper};
    use tokio::sync::Mutex;

    const OWNER: Address = Address([0xAA; 32]);
    const VOTER: Address = Address([1u8; 32]);

    /// Keeper plus store, applying one message at a time
    struct Harness {
        state: MemoryStateStore,
        keeper: LotteryKeeper<VoterKeeper>,
        lock: Mutex<()>,
    }

    impl Harness {
        fn new(voters: &[Address]) -> Self {
            let state = MemoryStateStore::new();
            let registry = VoterKeeper::default();
            for address in voters {
                state
                    .apply_batch(registry.register_voter(&Voter::new(*address, "")).unwrap())
                    .unwrap();
            }
            Self {
                state,
                keeper: LotteryKeeper::new(LotteryConfig::default(), registry),
                lock: Mutex::new(()),
            }
        }

        fn start(&self, sequence: u64) {
            let msg = LotteryMsg::StartRound(StartRound {
                owner: OWNER,
                sequence: Sequence::new(sequence),
                magnitude: 10,
                memo: String::new(),
            });
            let changes = self.keeper.handle(&self.state, &msg).unwrap();
            self.state.apply_batch(changes).unwrap();
        }
    }

    #[async_trait]
    impl RoundQuery for Harness {
        async fn round_status(&self, owner: &Address) -> SortilegeResult<RoundStatus> {
            self.keeper.round_status(&self.state, owner)
        }
    }

    #[async_trait]
    impl MessageSink for Harness {
        async fn submit(&self, sender: Address, msg: LotteryMsg) -> SortilegeResult<()> {
            let _guard = self.lock.lock().await;
            let signer = match &msg {
                LotteryMsg::Commit(c) => c.committer,
                LotteryMsg::Reveal(r) => r.revealer,
                other => other.owner(),
            };
            if signer != sender {
                return Err(SortilegeError::SignerMismatch {
                    expected: signer.to_hex(),
                    got: sender.to_hex(),
                });
            }
            let changes = self.keeper.handle(&self.state, &msg)?;
            self.state.apply_batch(changes)?;
            Ok(())
        }
    }

    fn status(phase: Phase, ledger: VoteLedger) -> RoundStatus {
        RoundStatus {
            owner: OWNER,
            sequence: Sequence::new(1),
            phase,
            tally: Tally::compute(ledger.entries()),
            ledger,
            result: None,
        }
    }

    #[test]
    fn test_commit_then_reveal() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut actor = VoterActor::new(VOTER, OWNER);
        let mut ledger = VoteLedger::from_voters(vec![VOTER]);

        let msg = actor.step_with_rng(&status(Phase::AwaitingCommit, ledger.clone()), &mut rng);
        let commitment = match msg {
            Some(LotteryMsg::Commit(c)) => c.commitment,
            other => panic!("expected commit, got {:?}", other),
        };

        // Nothing to do until the round moves on
        ledger.entry_mut(&VOTER).unwrap().commitment = commitment.clone();
        assert!(actor
            .step_with_rng(&status(Phase::AwaitingCommit, ledger.clone()), &mut rng)
            .is_none());

        match actor.step_with_rng(&status(Phase::AwaitingReveal, ledger), &mut rng) {
            Some(LotteryMsg::Reveal(r)) => {
                assert!(commitment::verify(r.value, &commitment));
                assert!((0..=1i64 << 32).contains(&r.value));
            }
            other => panic!("expected reveal, got {:?}", other),
        }
    }

    #[test]
    fn test_recommit_reuses_secret() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut actor = VoterActor::new(VOTER, OWNER);
        let view = status(Phase::AwaitingCommit, VoteLedger::from_voters(vec![VOTER]));

        let first = actor.step_with_rng(&view, &mut rng);
        let second = actor.step_with_rng(&view, &mut rng);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_idle_when_not_participating() {
        let mut actor = VoterActor::new(VOTER, OWNER);
        let other = VoteLedger::from_voters(vec![Address([2u8; 32])]);
        assert!(actor.step(&status(Phase::AwaitingCommit, other)).is_none());

        // No secret means nothing to reveal
        let mut ledger = VoteLedger::from_voters(vec![VOTER]);
        ledger.entry_mut(&VOTER).unwrap().commitment = vec![1, 2, 3];
        assert!(actor.step(&status(Phase::AwaitingReveal, ledger)).is_none());
    }

    #[tokio::test]
    async fn test_actors_finish_round() {
        let voters: Vec<_> = (1..=5u8).map(|b| Address([b; 32])).collect();
        let harness = Harness::new(&voters);
        harness.start(1);

        let mut actors: Vec<_> = voters.iter().map(|v| VoterActor::new(*v, OWNER)).collect();
        for _ in 0..3 {
            for actor in actors.iter_mut() {
                actor.poll_once(&harness, &harness).await.unwrap();
            }
        }

        let status = harness.round_status(&OWNER).await.unwrap();
        assert_eq!(status.phase, Phase::ResultReady);
        assert_eq!(status.result, Some(status.tally.sum));
        assert!(status.tally.revealed >= 4);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let voters: Vec<_> = (1..=5u8).map(|b| Address([b; 32])).collect();
        let harness = Arc::new(Harness::new(&voters));
        harness.start(1);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = ActorConfig { poll_interval_ms: 5 };
        let handles: Vec<_> = voters
            .iter()
            .map(|v| {
                let actor = VoterActor::new(*v, OWNER);
                tokio::spawn(actor.run(harness.clone(), harness.clone(), config.clone(), shutdown_rx.clone()))
            })
            .collect();

        let mut phase = Phase::AwaitingCommit;
        for _ in 0..400 {
            phase = harness.round_status(&OWNER).await.unwrap().phase;
            if phase == Phase::ResultReady {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(phase, Phase::ResultReady);

        shutdown_tx.send(true).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
