//! Core value types for the minter operator console.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Nano-units per whole token (jettons carry 9 decimals).
pub const NANO_PER_TOKEN: u128 = 1_000_000_000;

/// A ledger account address: workchain id plus 32-byte account id.
///
/// Parsed from and rendered in the raw form `<workchain>:<64 hex chars>`,
/// e.g. `0:3f5e...`. Friendly/base64 forms are the wallet UI's business,
/// not ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub workchain: i8,
    pub account: [u8; 32],
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (wc, account_hex) = s
            .split_once(':')
            .ok_or_else(|| ParseError::Address(s.to_string()))?;
        let workchain: i8 = wc
            .parse()
            .map_err(|_| ParseError::Address(s.to_string()))?;
        if account_hex.len() != 64 {
            return Err(ParseError::Address(s.to_string()));
        }
        let bytes = hex::decode(account_hex).map_err(|_| ParseError::Address(s.to_string()))?;
        let mut account = [0u8; 32];
        account.copy_from_slice(&bytes);
        Ok(Self { workchain, account })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.account))
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

/// A fixed-precision token amount in nano-units.
///
/// All arithmetic is checked integer math; there is no tolerance anywhere in
/// outcome classification because supplies are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn from_nano(nano: u128) -> Self {
        Self(nano)
    }

    pub fn as_nano(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Expected post-mint supply. `None` on overflow, which a real ledger
    /// would reject anyway.
    pub fn checked_add(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }
}

impl FromStr for TokenAmount {
    type Err = ParseError;

    /// Parses a decimal string ("1", "1.5", "0.000000001") into nano-units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let err = |reason: &str| ParseError::Amount {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        if input.is_empty() {
            return Err(err("empty"));
        }
        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(err("no digits"));
        }
        if frac.len() > 9 {
            return Err(err("more than 9 decimal places"));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err("not a decimal number"))?
        };
        let frac_nano: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<9}", frac);
            padded.parse().map_err(|_| err("not a decimal number"))?
        };
        whole
            .checked_mul(NANO_PER_TOKEN)
            .and_then(|n| n.checked_add(frac_nano))
            .map(TokenAmount)
            .ok_or_else(|| err("amount too large"))
    }
}

impl fmt::Display for TokenAmount {
    /// Renders in whole tokens, trimming trailing fractional zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANO_PER_TOKEN;
        let frac = self.0 % NANO_PER_TOKEN;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac = format!("{:09}", frac);
            write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
        }
    }
}

/// A contract's position in the ledger's causal order: the logical time of
/// its most recent transaction plus that transaction's hash.
///
/// Ordering is by logical time alone; per contract it only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPosition {
    pub lt: u64,
    pub hash: String,
}

impl TxPosition {
    pub fn new(lt: u64, hash: impl Into<String>) -> Self {
        Self {
            lt,
            hash: hash.into(),
        }
    }

    /// True when `self` is strictly newer than `baseline`.
    pub fn is_after(&self, baseline: &TxPosition) -> bool {
        self.lt > baseline.lt
    }
}

impl fmt::Display for TxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lt={} hash={}", self.lt, self.hash)
    }
}

/// Encoded jetton content. Off-chain layout: a 0x01 tag byte followed by the
/// metadata URL bytes. Equality is structural (byte-for-byte).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentCell(Vec<u8>);

const OFFCHAIN_CONTENT_TAG: u8 = 0x01;

impl ContentCell {
    /// Encodes an off-chain content cell pointing at a metadata URL.
    pub fn from_url(url: &str) -> Self {
        let mut bytes = Vec::with_capacity(1 + url.len());
        bytes.push(OFFCHAIN_CONTENT_TAG);
        bytes.extend_from_slice(url.as_bytes());
        Self(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes the metadata URL, if this is a well-formed off-chain cell.
    pub fn url(&self) -> Option<&str> {
        match self.0.split_first() {
            Some((&OFFCHAIN_CONTENT_TAG, rest)) => std::str::from_utf8(rest).ok(),
            _ => None,
        }
    }
}

/// Deployment status reported by the ledger for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Frozen,
    Uninitialized,
}

/// Raw account state as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractState {
    pub status: ContractStatus,
    /// Deployed code image; absent for uninitialized accounts.
    pub code: Option<Vec<u8>>,
    /// Most recent transaction, if the account has any history.
    pub last_transaction: Option<TxPosition>,
}

/// Bundled minter state read (`get_jetton_data`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonData {
    pub total_supply: TokenAmount,
    pub mintable: bool,
    pub admin: Address,
    pub content: ContentCell,
}

/// The session's target contract: address plus the code hash observed at
/// bind time. Fixed for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRef {
    pub address: Address,
    pub code_hash: [u8; 32],
}

/// What the current operator is allowed to do with the bound minter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    /// Compares the caller's wallet with the minter's reported admin.
    /// A session with no wallet configured is treated as admin, which keeps
    /// local dry-run setups usable.
    pub fn determine(caller: Option<&Address>, admin: &Address) -> Role {
        match caller {
            None => Role::Admin,
            Some(addr) if addr == admin => Role::Admin,
            Some(_) => Role::Viewer,
        }
    }
}

/// Validated mutation the operator wants applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintIntent {
    pub to: Address,
    pub amount: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminChangeIntent {
    pub new_admin: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChangeIntent {
    pub new_content: ContentCell,
}

/// Tri-state result of a mutating action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Post-state matches the intent.
    Applied,
    /// A new transaction settled but the observable did not change as
    /// expected (e.g. rejected by contract-side validation).
    NoVisibleChange,
    /// The poll budget ran out; the real outcome is unknown.
    Unconfirmed,
}
