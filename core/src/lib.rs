//! sortilege Core Library
//!
//! Core types, traits, and abstractions shared by the sortilege modules.
//! This crate provides the foundation for all other sortilege components.

pub mod types;
pub mod traits;
pub mod error;
pub mod config;
pub mod message;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use config::*;
pub use message::*;
