//! Owner set and confirmation bookkeeping
//!
//! Quorum accounting is kept apart from execution: the tracker only decides
//! who may confirm and whether enough of them have.

use crate::multisig::error::MultisigError;
use crate::multisig::record::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed, ordered set of owners with a confirmation quorum (M-of-N)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerSet {
    owners: Vec<String>,
    quorum: usize,
}

impl OwnerSet {
    /// Create a new owner set
    ///
    /// # Errors
    /// `InvalidArgument` if there are no owners, an owner identity is blank,
    /// identities repeat, or `quorum` is outside `1..=owners.len()`.
    pub fn new(owners: Vec<String>, quorum: usize) -> Result<Self, MultisigError> {
        if owners.is_empty() {
            return Err(MultisigError::InvalidArgument(
                "owner set must not be empty".to_string(),
            ));
        }

        if quorum == 0 || quorum > owners.len() {
            return Err(MultisigError::InvalidArgument(format!(
                "quorum {} must be between 1 and owner count {}",
                quorum,
                owners.len()
            )));
        }

        let mut seen = HashSet::new();
        for owner in &owners {
            if owner.trim().is_empty() {
                return Err(MultisigError::InvalidArgument(
                    "owner identity must not be blank".to_string(),
                ));
            }
            if !seen.insert(owner.as_str()) {
                return Err(MultisigError::InvalidArgument(format!(
                    "duplicate owner: {}",
                    owner
                )));
            }
        }

        Ok(Self { owners, quorum })
    }

    /// Get the quorum (M)
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Owners in configured order
    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// Get the total owner count (N)
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        self.owners.iter().any(|o| o == identity)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.quorum, self.owners.len())
    }
}

/// Records owner confirmations and answers quorum questions
#[derive(Clone, Debug)]
pub struct ConfirmationTracker {
    owners: OwnerSet,
}

impl ConfirmationTracker {
    pub fn new(owners: OwnerSet) -> Self {
        Self { owners }
    }

    pub fn owners(&self) -> &OwnerSet {
        &self.owners
    }

    /// Add `owner` to the record's confirmations.
    ///
    /// Returns `true` if the owner was newly added, `false` if it had already
    /// confirmed. Executed records accept no further confirmations.
    pub fn confirm(
        &self,
        record: &mut TransactionRecord,
        owner: &str,
    ) -> Result<bool, MultisigError> {
        if !self.owners.is_owner(owner) {
            return Err(MultisigError::UnknownOwner(owner.to_string()));
        }

        if record.executed {
            return Err(MultisigError::AlreadyExecuted(record.id));
        }

        if record.is_confirmed_by(owner) {
            return Ok(false);
        }

        record.push_confirmation(owner);
        Ok(true)
    }

    /// Check if the record has enough confirmations to execute
    pub fn has_quorum(&self, record: &TransactionRecord) -> bool {
        record.confirmation_count() >= self.owners.quorum()
    }

    /// Confirmations still missing before quorum
    pub fn remaining(&self, record: &TransactionRecord) -> usize {
        self.owners
            .quorum()
            .saturating_sub(record.confirmation_count())
    }
}
