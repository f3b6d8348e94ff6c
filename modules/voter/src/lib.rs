//! Voter Registry Module for sortilege
//!
//! Maintains the set of addresses eligible to take part in lottery rounds:
//! - Voter records keyed by address
//! - Register / revoke messages
//! - The `VoterRegistry` seam the lottery keeper snapshots from

pub mod voter;
pub mod msgs;
pub mod keeper;

pub use voter::*;
pub use msgs::*;
pub use keeper::*;
