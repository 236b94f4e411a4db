//! External ledger interface
//!
//! The ledger is the system of record: it applies mint and burn effects
//! atomically and durably, and answers balance queries. The engine only talks
//! to it through the [`Ledger`] trait.
//!
//! [`InMemoryLedger`] is an in-process fungible token that implements the
//! trait; the CLI and REST API run against it, and tests use its fault
//! injection to exercise failure paths.
//!
//! # Example
//!
//! ```ignore
//! use multisig_engine::ledger::{Address, InMemoryLedger, Ledger, TokenMetadata};
//!
//! let treasury = Address::parse("0x00000000000000000000000000000000000000aa")?;
//! let metadata = TokenMetadata::new("Carbon Token".into(), "CO2".into(), 18)?;
//! let ledger = InMemoryLedger::new(metadata, treasury, 1_000);
//!
//! let receipt = ledger.apply_burn(1, 250).await?;
//! assert_eq!(ledger.total_supply().await, 750);
//! ```

pub mod address;
pub mod memory;
pub mod serdes;

pub use address::{Address, AddressError};
pub use memory::{InMemoryLedger, LedgerState, SupplyEvent, TokenError, TokenMetadata};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors reported by a ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Transient failure reaching the ledger; safe to retry
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
    /// The ledger refused the operation; needs operator review
    #[error("Ledger rejected operation: {0}")]
    Rejected(String),
}

/// Supply-changing action applied by the ledger
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SupplyAction {
    Mint,
    Burn,
}

impl fmt::Display for SupplyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplyAction::Mint => f.write_str("mint"),
            SupplyAction::Burn => f.write_str("burn"),
        }
    }
}

/// Proof that the ledger applied an operation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    /// Proposal id the operation was applied for
    pub tx_id: u64,
    pub action: SupplyAction,
    /// Account credited (mint) or debited (burn)
    pub account: Address,
    #[serde(with = "crate::ledger::serdes::amount")]
    pub amount: u128,
    /// Hex SHA-256 over the applied operation
    pub hash: String,
    pub applied_at: DateTime<Utc>,
}

/// Token information as reported by the ledger
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "crate::ledger::serdes::amount")]
    pub total_supply: u128,
}

/// Operations the engine needs from the system of record.
///
/// Applies receive the proposal id so an implementation can deduplicate: a
/// second apply for an id it has already applied must return the original
/// receipt and leave balances untouched.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Credit `amount` to `account`, increasing total supply
    async fn apply_mint(
        &self,
        tx_id: u64,
        account: &Address,
        amount: u128,
    ) -> Result<Receipt, LedgerError>;

    /// Destroy `amount` from the ledger's own treasury
    async fn apply_burn(&self, tx_id: u64, amount: u128) -> Result<Receipt, LedgerError>;

    /// Current balance of an account
    async fn query_balance(&self, address: &Address) -> Result<u128, LedgerError>;

    /// Token name, symbol, decimals and supply
    async fn token_info(&self) -> Result<TokenInfo, LedgerError>;
}
