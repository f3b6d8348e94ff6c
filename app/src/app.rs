//! Application router
//!
//! Every delivered message goes through the same pipeline: decode, stateless
//! validation, signer check, keeper dispatch, one `apply_batch`. Nothing is
//! written unless the whole message is accepted, and an accepted message with
//! no effect leaves the version where it was.

use async_trait::async_trait;
use parking_lot::Mutex;
use sortilege_core::{
    Address, AppConfig, ModuleMessage, Sequence, SortilegeError, SortilegeResult, StateChange,
    StateMutator, StateProvider, StateRoot, StateVersion, TypedMessage,
};
use sortilege_lottery::{LotteryKeeper, LotteryMsg, MessageSink, Phase, RoundQuery, RoundStatus, VoteLedger};
use sortilege_state::StateStore;
use sortilege_voter::{Voter, VoterKeeper, VoterMsg, VoterRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::genesis::{GenesisConfig, GenesisVoter};

/// Any message the application accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Lottery(LotteryMsg),
    Voter(VoterMsg),
}

impl Msg {
    /// Decode an envelope by its module route
    pub fn decode(typed: &TypedMessage) -> SortilegeResult<Self> {
        match typed.route() {
            sortilege_lottery::msgs::ROUTE => Ok(Msg::Lottery(LotteryMsg::from_typed(typed)?)),
            sortilege_voter::msgs::ROUTE => Ok(Msg::Voter(VoterMsg::from_typed(typed)?)),
            _ => Err(SortilegeError::UnrecognizedMessage(typed.type_name.clone())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Msg::Lottery(msg) => msg.type_name(),
            Msg::Voter(msg) => msg.type_name(),
        }
    }

    pub fn signer(&self) -> Address {
        match self {
            Msg::Lottery(msg) => msg.signer(),
            Msg::Voter(msg) => msg.signer(),
        }
    }

    pub fn to_typed(&self) -> SortilegeResult<TypedMessage> {
        match self {
            Msg::Lottery(msg) => msg.to_typed(),
            Msg::Voter(msg) => msg.to_typed(),
        }
    }

    pub fn validate_basic(&self, config: &AppConfig) -> SortilegeResult<()> {
        match self {
            Msg::Lottery(msg) => msg.validate_basic(&config.lottery),
            Msg::Voter(msg) => msg.validate_basic(&config.voter),
        }
    }
}

impl From<LotteryMsg> for Msg {
    fn from(msg: LotteryMsg) -> Self {
        Msg::Lottery(msg)
    }
}

impl From<VoterMsg> for Msg {
    fn from(msg: VoterMsg) -> Self {
        Msg::Voter(msg)
    }
}

/// Voter registry and lottery rounds over one store
pub struct SortilegeApp<S: StateStore> {
    state: Arc<S>,
    config: AppConfig,
    voters: VoterKeeper,
    lottery: LotteryKeeper<VoterKeeper>,
    // Held from the first read to the batch write of a message
    apply_lock: Mutex<()>,
}

impl<S: StateStore> SortilegeApp<S> {
    pub fn new(state: Arc<S>, config: AppConfig) -> SortilegeResult<Self> {
        config.lottery.validate().map_err(SortilegeError::ConfigError)?;

        let voters = VoterKeeper::new(config.voter.clone());
        let lottery = LotteryKeeper::new(config.lottery.clone(), voters.clone());

        Ok(Self {
            state,
            config,
            voters,
            lottery,
            apply_lock: Mutex::new(()),
        })
    }

    /// Build an application and load a genesis into it
    pub fn from_genesis(state: Arc<S>, genesis: &GenesisConfig) -> SortilegeResult<Self> {
        let app = Self::new(state, genesis.app.clone())?;
        app.init_genesis(genesis)?;
        Ok(app)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<S> {
        &self.state
    }

    pub fn lottery(&self) -> &LotteryKeeper<VoterKeeper> {
        &self.lottery
    }

    /// Register the genesis voters in one batch
    pub fn init_genesis(&self, genesis: &GenesisConfig) -> SortilegeResult<StateVersion> {
        info!("Initializing genesis for chain: {}", genesis.chain_name);

        let mut changes = Vec::new();
        for voter in genesis.parse_voters()? {
            info!("Genesis voter: {}", voter.address);
            changes.extend(self.voters.register_voter(&voter)?);
        }

        let _guard = self.apply_lock.lock();
        let version = self.state.apply_batch(changes)?;
        info!("Genesis initialized with {} voters", genesis.voters.len());
        Ok(version)
    }

    /// Current registry and config as a genesis
    pub fn export_genesis(&self, chain_name: &str) -> SortilegeResult<GenesisConfig> {
        let voters = self
            .voters()?
            .into_iter()
            .map(|voter| GenesisVoter {
                address: voter.address.to_hex(),
                memo: voter.memo,
            })
            .collect();

        Ok(GenesisConfig {
            chain_name: chain_name.to_string(),
            voters,
            app: self.config.clone(),
        })
    }

    /// Decode and apply an envelope sent by `sender`
    pub fn deliver(&self, sender: Address, typed: &TypedMessage) -> SortilegeResult<StateVersion> {
        let msg = Msg::decode(typed).map_err(|e| {
            warn!("Rejected {} from {}: {}", typed.type_name, sender, e);
            e
        })?;
        self.deliver_msg(sender, &msg)
    }

    /// Apply a decoded message sent by `sender`
    pub fn deliver_msg(&self, sender: Address, msg: &Msg) -> SortilegeResult<StateVersion> {
        let _guard = self.apply_lock.lock();

        let changes = match self.execute(sender, msg) {
            Ok(changes) => changes,
            Err(e) => {
                warn!("Rejected {} from {}: {}", msg.type_name(), sender, e);
                return Err(e);
            }
        };

        if changes.is_empty() {
            debug!("{} from {} changed nothing", msg.type_name(), sender);
            return Ok(self.state.version());
        }

        debug!("Applying {} changes for {}", changes.len(), msg.type_name());
        self.state.apply_batch(changes)
    }

    fn execute(&self, sender: Address, msg: &Msg) -> SortilegeResult<Vec<StateChange>> {
        msg.validate_basic(&self.config)?;

        let signer = msg.signer();
        if signer != sender {
            return Err(SortilegeError::SignerMismatch {
                expected: signer.to_hex(),
                got: sender.to_hex(),
            });
        }

        let state: &dyn StateProvider = self.state.as_ref();
        match msg {
            Msg::Lottery(msg) => self.lottery.handle(state, msg),
            Msg::Voter(msg) => self.voters.handle(state, msg),
        }
    }

    // Queries

    pub fn voters(&self) -> SortilegeResult<Vec<Voter>> {
        self.voters.voters(self.state.as_ref())
    }

    pub fn sequence(&self, owner: &Address) -> SortilegeResult<Sequence> {
        self.lottery.sequence(self.state.as_ref(), owner)
    }

    pub fn phase(&self, owner: &Address) -> SortilegeResult<Phase> {
        self.lottery.phase(self.state.as_ref(), owner)
    }

    pub fn ledger(&self, owner: &Address) -> SortilegeResult<VoteLedger> {
        self.lottery.ledger(self.state.as_ref(), owner)
    }

    pub fn result(&self, owner: &Address, sequence: Sequence) -> SortilegeResult<Option<i64>> {
        self.lottery.result(self.state.as_ref(), owner, sequence)
    }

    pub fn round_status(&self, owner: &Address) -> SortilegeResult<RoundStatus> {
        self.lottery.round_status(self.state.as_ref(), owner)
    }

    pub fn version(&self) -> StateVersion {
        self.state.version()
    }

    pub fn state_root(&self) -> SortilegeResult<StateRoot> {
        self.state.compute_root()
    }
}

#[async_trait]
impl<S: StateStore> RoundQuery for SortilegeApp<S> {
    async fn round_status(&self, owner: &Address) -> SortilegeResult<RoundStatus> {
        SortilegeApp::round_status(self, owner)
    }
}

#[async_trait]
impl<S: StateStore> MessageSink for SortilegeApp<S> {
    async fn submit(&self, sender: Address, msg: LotteryMsg) -> SortilegeResult<()> {
        self.deliver_msg(sender, &Msg::Lottery(msg))?;
        Ok(())
    }
}
