//! Error types shared across the console.

use thiserror::Error;

/// Failures while parsing operator-supplied scalars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid address '{0}': expected <workchain>:<64 hex chars>")]
    Address(String),

    #[error("invalid token amount '{input}': {reason}")]
    Amount { input: String, reason: String },

    #[error("invalid content cell: {0}")]
    Content(String),
}

/// Fatal precondition violations. These abort the current action instead of
/// looping back to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// An administered minter always has at least its deployment transaction.
    /// Seeing no history means we are looking at the wrong contract.
    #[error("contract {0} has no recorded transactions; cannot establish a settlement baseline")]
    NoHistory(crate::types::Address),
}
