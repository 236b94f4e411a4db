//! Transaction records awaiting confirmation and execution

use crate::ledger::{Address, Receipt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of supply change a record proposes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxType {
    Mint,
    Burn,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxType::Mint => f.write_str("mint"),
            TxType::Burn => f.write_str("burn"),
        }
    }
}

/// A single owner confirmation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Confirmation {
    /// Owner identity
    pub owner: String,
    /// When the confirmation was recorded
    pub confirmed_at: DateTime<Utc>,
}

/// Lifecycle state of a record.
///
/// `Confirmed` is derived from the confirmation count and never stored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Waiting for more confirmations
    Pending,
    /// Quorum reached, ready to execute
    Confirmed,
    /// Applied to the ledger (terminal)
    Executed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => f.write_str("pending"),
            ProposalStatus::Confirmed => f.write_str("confirmed"),
            ProposalStatus::Executed => f.write_str("executed"),
        }
    }
}

/// A proposed mint or burn
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Sequential id assigned by the store
    pub id: u64,
    pub tx_type: TxType,
    /// Mint recipient; burns debit the ledger treasury and carry no account
    pub account: Option<Address>,
    /// Quantity in the smallest unit of the asset
    #[serde(with = "crate::ledger::serdes::amount")]
    pub amount: u128,
    pub executed: bool,
    /// Distinct owners that confirmed, in confirmation order
    pub confirmations: Vec<Confirmation>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    /// Ledger receipt of the successful execution
    pub receipt: Option<Receipt>,
}

impl TransactionRecord {
    /// Create a new, unconfirmed record
    pub fn new(id: u64, tx_type: TxType, account: Option<Address>, amount: u128) -> Self {
        Self {
            id,
            tx_type,
            account,
            amount,
            executed: false,
            confirmations: Vec::new(),
            created_at: Utc::now(),
            executed_at: None,
            receipt: None,
        }
    }

    /// Get number of distinct confirmations
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    /// Check whether an owner already confirmed
    pub fn is_confirmed_by(&self, owner: &str) -> bool {
        self.confirmations.iter().any(|c| c.owner == owner)
    }

    /// Owners who confirmed, in order
    pub fn confirmed_by(&self) -> Vec<&str> {
        self.confirmations.iter().map(|c| c.owner.as_str()).collect()
    }

    /// Derive the lifecycle state for a given quorum
    pub fn status(&self, quorum: usize) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.confirmation_count() >= quorum {
            ProposalStatus::Confirmed
        } else {
            ProposalStatus::Pending
        }
    }

    /// Append a confirmation; callers enforce set semantics
    pub(crate) fn push_confirmation(&mut self, owner: &str) {
        self.confirmations.push(Confirmation {
            owner: owner.to_string(),
            confirmed_at: Utc::now(),
        });
    }

    /// Mark as executed with the ledger receipt
    pub(crate) fn mark_executed(&mut self, receipt: Receipt) {
        self.executed = true;
        self.executed_at = Some(receipt.applied_at);
        self.receipt = Some(receipt);
    }
}
