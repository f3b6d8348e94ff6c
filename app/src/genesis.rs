//! Genesis configuration

use serde::{Deserialize, Serialize};
use sortilege_core::{Address, AppConfig, Hash, SortilegeError, SortilegeResult};
use sortilege_voter::{Voter, VoterMsg};

/// Voter registered at genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisVoter {
    /// Hex-encoded address
    pub address: String,
    #[serde(default)]
    pub memo: String,
}

/// Genesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Chain name
    pub chain_name: String,
    /// Initial voter registry
    #[serde(default)]
    pub voters: Vec<GenesisVoter>,
    /// Application config
    #[serde(default)]
    pub app: AppConfig,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            chain_name: "Sortilege".to_string(),
            voters: vec![],
            app: AppConfig::default(),
        }
    }
}

impl GenesisConfig {
    /// Create a devnet genesis config for development
    pub fn devnet() -> Self {
        let mut app = AppConfig::default();
        app.log_level = "debug".to_string();
        app.actor.poll_interval_ms = 200;

        Self {
            chain_name: "Sortilege Devnet".to_string(),
            app,
            ..Default::default()
        }
    }

    /// Add a voter
    pub fn add_voter(mut self, address: &str, memo: &str) -> Self {
        self.voters.push(GenesisVoter {
            address: address.to_string(),
            memo: memo.to_string(),
        });
        self
    }

    /// Parse and validate the genesis voters
    pub fn parse_voters(&self) -> SortilegeResult<Vec<Voter>> {
        self.voters
            .iter()
            .map(|entry| {
                let address = Address::from_hex(&entry.address)
                    .map_err(|e| SortilegeError::InvalidAddress(format!("{}: {}", entry.address, e)))?;
                VoterMsg::register(address, entry.memo.clone()).validate_basic(&self.app.voter)?;
                Ok(Voter::new(address, entry.memo.clone()))
            })
            .collect()
    }

    pub fn validate(&self) -> SortilegeResult<()> {
        self.app.lottery.validate().map_err(SortilegeError::ConfigError)?;
        self.parse_voters()?;
        Ok(())
    }

    /// Save to JSON
    pub fn to_json(&self) -> SortilegeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SortilegeError::SerializationError(e.to_string()))
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> SortilegeResult<Self> {
        serde_json::from_str(json).map_err(|e| SortilegeError::DeserializationError(e.to_string()))
    }
}

/// Genesis hash computation
pub fn compute_genesis_hash(config: &GenesisConfig) -> SortilegeResult<Hash> {
    let json = config.to_json()?;
    Ok(sortilege_crypto::hashing::hash(json.as_bytes()))
}
