//! Errors returned by multisig operations

use crate::ledger::{AddressError, LedgerError};
use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    /// Malformed amount, address or configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Transaction not found: {0}")]
    NotFound(u64),
    #[error("Not an owner: {0}")]
    UnknownOwner(String),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Quorum not met for transaction {id}: have {have}, need {need}")]
    QuorumNotMet { id: u64, have: usize, need: usize },
    /// Transient failure reaching the ledger; safe to retry with backoff
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
    /// The ledger refused the operation; needs operator review
    #[error("Ledger rejected: {0}")]
    LedgerRejected(String),
}

impl MultisigError {
    /// Whether a caller may retry the same call unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, MultisigError::LedgerUnavailable(_))
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            MultisigError::InvalidArgument(_) => "invalid_argument",
            MultisigError::NotFound(_) => "not_found",
            MultisigError::UnknownOwner(_) => "unknown_owner",
            MultisigError::AlreadyExecuted(_) => "already_executed",
            MultisigError::QuorumNotMet { .. } => "quorum_not_met",
            MultisigError::LedgerUnavailable(_) => "ledger_unavailable",
            MultisigError::LedgerRejected(_) => "ledger_rejected",
        }
    }

    /// Process exit status used by the CLI
    pub fn exit_code(&self) -> u8 {
        match self {
            MultisigError::InvalidArgument(_) => 3,
            MultisigError::NotFound(_) => 4,
            MultisigError::UnknownOwner(_) => 5,
            MultisigError::AlreadyExecuted(_) => 6,
            MultisigError::QuorumNotMet { .. } => 7,
            MultisigError::LedgerUnavailable(_) => 8,
            MultisigError::LedgerRejected(_) => 9,
        }
    }
}

impl From<LedgerError> for MultisigError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unavailable(msg) => MultisigError::LedgerUnavailable(msg),
            LedgerError::Rejected(msg) => MultisigError::LedgerRejected(msg),
        }
    }
}

impl From<AddressError> for MultisigError {
    fn from(err: AddressError) -> Self {
        MultisigError::InvalidArgument(err.to_string())
    }
}

/// Parse an operator-supplied amount in the smallest unit.
///
/// Negative, fractional and non-numeric input is an `InvalidArgument`.
pub fn parse_amount(input: &str) -> Result<u128, MultisigError> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(MultisigError::InvalidArgument(format!(
            "amount must not be negative: {}",
            trimmed
        )));
    }

    trimmed
        .parse::<u128>()
        .map_err(|_| MultisigError::InvalidArgument(format!("invalid amount: {:?}", input)))
}
