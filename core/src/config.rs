//! Configuration types for sortilege

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name for logging
    pub name: String,

    /// Logging level
    pub log_level: String,

    /// Lottery module configuration
    #[serde(default)]
    pub lottery: LotteryConfig,

    /// Voter registry configuration
    #[serde(default)]
    pub voter: VoterConfig,

    /// Automated voter configuration
    #[serde(default)]
    pub actor: ActorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "sortilege".to_string(),
            log_level: "info".to_string(),
            lottery: LotteryConfig::default(),
            voter: VoterConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

/// A strict supermajority ratio: reached when `count / total > numerator / denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumRatio {
    pub numerator: u64,
    pub denominator: u64,
}

impl QuorumRatio {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Check whether `count` out of `total` strictly exceeds the ratio
    pub fn is_exceeded(&self, count: usize, total: usize) -> bool {
        (count as u128) * (self.denominator as u128) > (total as u128) * (self.numerator as u128)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.denominator == 0 {
            return Err("quorum denominator must be non-zero".into());
        }
        if self.numerator > self.denominator {
            return Err(format!(
                "quorum {}/{} is unreachable",
                self.numerator, self.denominator
            ));
        }
        Ok(())
    }
}

/// Lottery module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Maximum memo length in bytes
    pub max_memo_bytes: usize,

    /// Upper bound for the magnitude of a round
    pub max_magnitude: i64,

    /// Largest value a participant may reveal
    pub max_reveal_value: i64,

    /// Commit quorum that moves a round into the reveal phase
    pub commit_quorum: QuorumRatio,

    /// Reveal quorum that finalizes a round
    pub reveal_quorum: QuorumRatio,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            max_memo_bytes: 1024,
            max_magnitude: 10240,
            max_reveal_value: 1 << 32,
            commit_quorum: QuorumRatio::new(4, 5), // > 80%
            reveal_quorum: QuorumRatio::new(3, 4), // > 75%
        }
    }
}

impl LotteryConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.commit_quorum.validate()?;
        self.reveal_quorum.validate()?;
        if self.max_magnitude <= 0 {
            return Err("max_magnitude must be positive".into());
        }
        if self.max_reveal_value < 0 {
            return Err("max_reveal_value must not be negative".into());
        }
        Ok(())
    }
}

/// Voter registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterConfig {
    /// Maximum memo length in bytes
    pub max_memo_bytes: usize,
}

impl Default for VoterConfig {
    fn default() -> Self {
        Self {
            max_memo_bytes: 1024,
        }
    }
}

/// Automated voter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Interval between round status polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}
