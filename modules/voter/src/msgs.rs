//! Voter registry messages

use serde::{Deserialize, Serialize};
use sortilege_core::{
    Address, ModuleMessage, SortilegeError, SortilegeResult, TypedMessage, VoterConfig,
};

pub const ROUTE: &str = "voter";
pub const REGISTER_TYPE: &str = "voter/register";
pub const REVOKE_TYPE: &str = "voter/revoke";

/// Register (or re-register) the signer as a voter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterVoter {
    pub address: Address,
    pub memo: String,
}

/// Remove the signer from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeVoter {
    pub address: Address,
}

/// All voter registry messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoterMsg {
    Register(RegisterVoter),
    Revoke(RevokeVoter),
}

impl VoterMsg {
    pub fn register(address: Address, memo: impl Into<String>) -> Self {
        VoterMsg::Register(RegisterVoter {
            address,
            memo: memo.into(),
        })
    }

    pub fn revoke(address: Address) -> Self {
        VoterMsg::Revoke(RevokeVoter { address })
    }

    /// Stateless checks, run before the store is touched
    pub fn validate_basic(&self, config: &VoterConfig) -> SortilegeResult<()> {
        match self {
            VoterMsg::Register(msg) => {
                if msg.address == Address::ZERO {
                    return Err(SortilegeError::InvalidAddress(
                        "RegisterVoter.address must not be empty".into(),
                    ));
                }
                if msg.memo.len() > config.max_memo_bytes {
                    return Err(SortilegeError::MemoTooLong {
                        max: config.max_memo_bytes,
                        got: msg.memo.len(),
                    });
                }
                Ok(())
            }
            VoterMsg::Revoke(msg) => {
                if msg.address == Address::ZERO {
                    return Err(SortilegeError::InvalidAddress(
                        "RevokeVoter.address must not be empty".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl ModuleMessage for VoterMsg {
    fn type_name(&self) -> &'static str {
        match self {
            VoterMsg::Register(_) => REGISTER_TYPE,
            VoterMsg::Revoke(_) => REVOKE_TYPE,
        }
    }

    fn signer(&self) -> Address {
        match self {
            VoterMsg::Register(msg) => msg.address,
            VoterMsg::Revoke(msg) => msg.address,
        }
    }

    fn to_typed(&self) -> SortilegeResult<TypedMessage> {
        match self {
            VoterMsg::Register(msg) => TypedMessage::encode(REGISTER_TYPE, msg),
            VoterMsg::Revoke(msg) => TypedMessage::encode(REVOKE_TYPE, msg),
        }
    }

    fn from_typed(msg: &TypedMessage) -> SortilegeResult<Self> {
        match msg.type_name.as_str() {
            REGISTER_TYPE => Ok(VoterMsg::Register(msg.decode_body()?)),
            REVOKE_TYPE => Ok(VoterMsg::Revoke(msg.decode_body()?)),
            other => Err(SortilegeError::UnrecognizedMessage(other.to_string())),
        }
    }
}
