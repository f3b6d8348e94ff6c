//! Lottery messages and their stateless validation

use serde::{Deserialize, Serialize};
use sortilege_core::{
    Address, LotteryConfig, ModuleMessage, Sequence, SortilegeError, SortilegeResult, TypedMessage,
};

pub const ROUTE: &str = "lottery";
pub const SETUP_TYPE: &str = "lottery/setup";
pub const START_ROUND_TYPE: &str = "lottery/start_round";
pub const COMMIT_TYPE: &str = "lottery/commit";
pub const REVEAL_TYPE: &str = "lottery/reveal";

/// Reset an owner's round configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRound {
    pub owner: Address,
    /// Must equal the owner's stored sequence
    pub sequence: Sequence,
    pub participant_names: Vec<String>,
    pub memo: String,
}

/// Open a new round over the current voter registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRound {
    pub owner: Address,
    /// Must equal the owner's stored sequence plus one
    pub sequence: Sequence,
    /// How many prize numbers the round is meant to produce
    pub magnitude: i64,
    pub memo: String,
}

/// Hash commitment from one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub owner: Address,
    pub committer: Address,
    pub sequence: Sequence,
    pub commitment: Vec<u8>,
}

/// Value reveal from one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub owner: Address,
    pub revealer: Address,
    pub sequence: Sequence,
    pub value: i64,
}

/// All lottery messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotteryMsg {
    Setup(SetupRound),
    StartRound(StartRound),
    Commit(Commit),
    Reveal(Reveal),
}

fn check_address(address: &Address, field: &str) -> SortilegeResult<()> {
    if *address == Address::ZERO {
        return Err(SortilegeError::InvalidAddress(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn check_memo(memo: &str, config: &LotteryConfig) -> SortilegeResult<()> {
    if memo.len() > config.max_memo_bytes {
        return Err(SortilegeError::MemoTooLong {
            max: config.max_memo_bytes,
            got: memo.len(),
        });
    }
    Ok(())
}

impl LotteryMsg {
    /// Owner whose round the message targets
    pub fn owner(&self) -> Address {
        match self {
            LotteryMsg::Setup(msg) => msg.owner,
            LotteryMsg::StartRound(msg) => msg.owner,
            LotteryMsg::Commit(msg) => msg.owner,
            LotteryMsg::Reveal(msg) => msg.owner,
        }
    }

    /// Stateless checks, run before the store is touched
    pub fn validate_basic(&self, config: &LotteryConfig) -> SortilegeResult<()> {
        match self {
            LotteryMsg::Setup(msg) => msg.validate_basic(config),
            LotteryMsg::StartRound(msg) => msg.validate_basic(config),
            LotteryMsg::Commit(msg) => msg.validate_basic(config),
            LotteryMsg::Reveal(msg) => msg.validate_basic(config),
        }
    }
}

impl SetupRound {
    pub fn validate_basic(&self, config: &LotteryConfig) -> SortilegeResult<()> {
        check_address(&self.owner, "SetupRound.owner")?;
        if self.participant_names.is_empty() {
            return Err(SortilegeError::EmptyParticipantList);
        }
        check_memo(&self.memo, config)
    }
}

impl StartRound {
    pub fn validate_basic(&self, config: &LotteryConfig) -> SortilegeResult<()> {
        check_address(&self.owner, "StartRound.owner")?;
        if self.magnitude <= 0 || self.magnitude > config.max_magnitude {
            return Err(SortilegeError::InvalidMagnitude {
                got: self.magnitude,
                max: config.max_magnitude,
            });
        }
        check_memo(&self.memo, config)
    }
}

impl Commit {
    pub fn validate_basic(&self, _config: &LotteryConfig) -> SortilegeResult<()> {
        check_address(&self.owner, "Commit.owner")?;
        check_address(&self.committer, "Commit.committer")?;
        if self.commitment.is_empty() {
            return Err(SortilegeError::EmptyCommitment);
        }
        Ok(())
    }
}

impl Reveal {
    /// Values are bounded to `[0, max_reveal_value]`
    pub fn validate_basic(&self, config: &LotteryConfig) -> SortilegeResult<()> {
        check_address(&self.owner, "Reveal.owner")?;
        check_address(&self.revealer, "Reveal.revealer")?;
        if self.value < 0 || self.value > config.max_reveal_value {
            return Err(SortilegeError::ValueOutOfRange {
                got: self.value,
                max: config.max_reveal_value,
            });
        }
        Ok(())
    }
}

impl ModuleMessage for LotteryMsg {
    fn type_name(&self) -> &'static str {
        match self {
            LotteryMsg::Setup(_) => SETUP_TYPE,
            LotteryMsg::StartRound(_) => START_ROUND_TYPE,
            LotteryMsg::Commit(_) => COMMIT_TYPE,
            LotteryMsg::Reveal(_) => REVEAL_TYPE,
        }
    }

    fn signer(&self) -> Address {
        match self {
            LotteryMsg::Setup(msg) => msg.owner,
            LotteryMsg::StartRound(msg) => msg.owner,
            LotteryMsg::Commit(msg) => msg.committer,
            LotteryMsg::Reveal(msg) => msg.revealer,
        }
    }

    fn to_typed(&self) -> SortilegeResult<TypedMessage> {
        match self {
            LotteryMsg::Setup(msg) => TypedMessage::encode(SETUP_TYPE, msg),
            LotteryMsg::StartRound(msg) => TypedMessage::encode(START_ROUND_TYPE, msg),
            LotteryMsg::Commit(msg) => TypedMessage::encode(COMMIT_TYPE, msg),
            LotteryMsg::Reveal(msg) => TypedMessage::encode(REVEAL_TYPE, msg),
        }
    }

    fn from_typed(msg: &TypedMessage) -> SortilegeResult<Self> {
        match msg.type_name.as_str() {
            SETUP_TYPE => Ok(LotteryMsg::Setup(msg.decode_body()?)),
            START_ROUND_TYPE => Ok(LotteryMsg::StartRound(msg.decode_body()?)),
            COMMIT_TYPE => Ok(LotteryMsg::Commit(msg.decode_body()?)),
            REVEAL_TYPE => Ok(LotteryMsg::Reveal(msg.decode_body()?)),
            other => Err(SortilegeError::UnrecognizedMessage(other.to_string())),
        }
    }
}
