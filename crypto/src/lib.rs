//! sortilege Cryptography Module
//!
//! Provides the hashing primitives used across the workspace:
//! - BLAKE3 for hashing
//! - Merkle roots for state commitments
//! - The commit-reveal commitment scheme

pub mod hashing;
pub mod commitment;

pub use hashing::*;
pub use commitment::*;
