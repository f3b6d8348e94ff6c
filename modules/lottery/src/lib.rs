//! Lottery Module for sortilege
//!
//! Implements commit-reveal lottery rounds owned by an address:
//! - Per-owner round state under a namespaced key prefix
//! - Setup / start-round / commit / reveal phase state machine
//! - Supermajority quorums for the commit and reveal phases
//! - Replay protection through per-owner sequence numbers
//! - An automated voter that drives its own participation

pub mod keys;
pub mod ledger;
pub mod aggregate;
pub mod msgs;
pub mod keeper;
pub mod actor;

pub use keys::*;
pub use ledger::*;
pub use aggregate::*;
pub use msgs::*;
pub use keeper::*;
pub use actor::*;
