//! Voter keeper - registry reads and writes

use sortilege_core::{Address, SortilegeError, SortilegeResult, StateChange, StateProvider, VoterConfig};
use tracing::{debug, info};

use crate::msgs::VoterMsg;
use crate::voter::{parse_voter_key, voter_key, Voter, VOTER_PREFIX};

/// Source of the currently registered voters
pub trait VoterRegistry: Send + Sync {
    /// All registered voters in ascending address order
    fn voters(&self, state: &dyn StateProvider) -> SortilegeResult<Vec<Voter>>;

    /// Check whether an address is currently registered
    fn is_registered(&self, state: &dyn StateProvider, address: &Address) -> SortilegeResult<bool>;
}

/// Store-backed voter registry
#[derive(Debug, Clone, Default)]
pub struct VoterKeeper {
    config: VoterConfig,
}

impl VoterKeeper {
    pub fn new(config: VoterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VoterConfig {
        &self.config
    }

    /// Look up one voter
    pub fn get_voter(&self, state: &dyn StateProvider, address: &Address) -> SortilegeResult<Voter> {
        match state.get(&voter_key(address))? {
            Some(bytes) => Voter::from_entry(*address, &bytes),
            None => Err(SortilegeError::VoterNotFound(address.to_hex())),
        }
    }

    /// Changes that register (or overwrite) a voter
    pub fn register_voter(&self, voter: &Voter) -> SortilegeResult<Vec<StateChange>> {
        Ok(vec![StateChange::set(voter_key(&voter.address), voter.to_bytes()?)])
    }

    /// Changes that remove a voter; absent voters are a no-op
    pub fn revoke_voter(&self, address: &Address) -> Vec<StateChange> {
        vec![StateChange::delete(voter_key(address))]
    }

    /// Execute a validated registry message
    pub fn handle(&self, state: &dyn StateProvider, msg: &VoterMsg) -> SortilegeResult<Vec<StateChange>> {
        match msg {
            VoterMsg::Register(register) => {
                let voter = Voter::new(register.address, register.memo.clone());
                info!("Registered voter {}", voter.address);
                self.register_voter(&voter)
            }
            VoterMsg::Revoke(revoke) => {
                if !self.is_registered(state, &revoke.address)? {
                    debug!("Revoke for unregistered voter {}", revoke.address);
                }
                info!("Revoked voter {}", revoke.address);
                Ok(self.revoke_voter(&revoke.address))
            }
        }
    }
}

impl VoterRegistry for VoterKeeper {
    fn voters(&self, state: &dyn StateProvider) -> SortilegeResult<Vec<Voter>> {
        let mut voters = Vec::new();
        for (key, value) in state.scan_prefix(VOTER_PREFIX)? {
            let address = parse_voter_key(&key).ok_or_else(|| {
                SortilegeError::StateCorruption(format!("malformed voter key {:?}", key))
            })?;
            voters.push(Voter::from_entry(address, &value)?);
        }
        voters.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(voters)
    }

    fn is_registered(&self, state: &dyn StateProvider, address: &Address) -> SortilegeResult<bool> {
        state.exists(&voter_key(address))
    }
}
