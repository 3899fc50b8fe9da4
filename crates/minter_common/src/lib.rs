//! Minter Common - Shared types and configuration for the minter operator console.
//!
//! Value types only: addresses, amounts, ledger positions, content cells,
//! session roles and action outcomes. No I/O except config file loading.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
