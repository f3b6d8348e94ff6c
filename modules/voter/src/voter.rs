//! Voter records and their store key layout

use serde::{Deserialize, Serialize};
use sortilege_core::{Address, SortilegeResult};
use sortilege_state::{decode_value, encode_value};

/// Key prefix for voter records
pub const VOTER_PREFIX: &[u8] = &[0x02];

/// Build voter key
pub fn voter_key(address: &Address) -> Vec<u8> {
    let mut key = VOTER_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

/// Parse voter key
pub fn parse_voter_key(key: &[u8]) -> Option<Address> {
    key.strip_prefix(VOTER_PREFIX).and_then(Address::from_slice)
}

/// An address registered to take part in rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub address: Address,
    pub memo: String,
}

impl Voter {
    pub fn new(address: Address, memo: impl Into<String>) -> Self {
        Self {
            address,
            memo: memo.into(),
        }
    }

    /// Stored value, without the address already carried by the key
    pub fn to_bytes(&self) -> SortilegeResult<Vec<u8>> {
        encode_value(&VoterRecord {
            memo: self.memo.clone(),
        })
    }

    pub fn from_entry(address: Address, value: &[u8]) -> SortilegeResult<Self> {
        let record: VoterRecord = decode_value(value)?;
        Ok(Self {
            address,
            memo: record.memo,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VoterRecord {
    memo: String,
}
