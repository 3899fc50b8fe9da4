//! Mint Control - operator console for a deployed jetton minter contract.
//!
//! Administrators mint tokens, rotate the admin address and update content
//! metadata; everyone else gets read-only info. The ledger is eventually
//! consistent with no push channel, so every mutation runs the same
//! commit / poll-for-settlement / verify-post-state workflow.

pub mod actions;
pub mod client;
pub mod console;
pub mod guard;
pub mod poll;
pub mod session;
pub mod testkit;
