//! sortilege application
//!
//! Wires the voter registry and the lottery keeper over one state store:
//! - Routes typed messages to the owning module
//! - Applies each accepted message as a single atomic batch
//! - Genesis import/export and tracing setup

pub mod app;
pub mod genesis;
pub mod telemetry;

pub use app::*;
pub use genesis::*;
pub use telemetry::*;
