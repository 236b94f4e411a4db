//! In-process fungible token ledger
//!
//! Balances, total supply and a bounded supply-change history, with receipts
//! remembered per proposal id so that a repeated apply is a no-op.

use crate::crypto::hash_fields;
use crate::ledger::{Address, Ledger, LedgerError, Receipt, SupplyAction, TokenInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Supply events kept in history
const MAX_HISTORY: usize = 100;

/// Token-level validation and accounting errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Total supply overflow")]
    SupplyOverflow,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
}

impl From<TokenError> for LedgerError {
    fn from(err: TokenError) -> Self {
        LedgerError::Rejected(err.to_string())
    }
}

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Token name (e.g., "Carbon Token")
    pub name: String,
    /// Token symbol (e.g., "CO2")
    pub symbol: String,
    /// Decimal places, reported only; amounts are always in the smallest unit
    pub decimals: u8,
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(name: String, symbol: String, decimals: u8) -> Result<Self, TokenError> {
        if name.is_empty() || name.len() > 50 {
            return Err(TokenError::InvalidName);
        }

        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > 18 {
            return Err(TokenError::InvalidDecimals);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            created_at: Utc::now(),
        })
    }
}

/// A mint or burn that changed total supply
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplyEvent {
    pub tx_id: u64,
    pub action: SupplyAction,
    pub account: Address,
    #[serde(with = "crate::ledger::serdes::amount")]
    pub amount: u128,
    #[serde(with = "crate::ledger::serdes::amount")]
    pub total_supply_after: u128,
    pub timestamp: DateTime<Utc>,
}

/// Serializable ledger contents
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LedgerState {
    pub metadata: TokenMetadata,
    /// Account that holds the initial supply and is debited by burns
    pub treasury: Address,
    total_supply: u128,
    /// Balances keyed by address
    balances: BTreeMap<String, u128>,
    /// Receipts by proposal id, for deduplication
    applied: BTreeMap<u64, Receipt>,
    /// Supply history (last 100)
    history: Vec<SupplyEvent>,
}

impl LedgerState {
    /// Create a new state with all supply allocated to the treasury
    pub fn new(metadata: TokenMetadata, treasury: Address, initial_supply: u128) -> Self {
        let mut balances = BTreeMap::new();
        if initial_supply > 0 {
            balances.insert(treasury.as_str().to_string(), initial_supply);
        }

        Self {
            metadata,
            treasury,
            total_supply: initial_supply,
            balances,
            applied: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address.as_str()).copied().unwrap_or(0)
    }

    /// Get holder count
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    pub fn history(&self) -> &[SupplyEvent] {
        &self.history
    }

    /// Receipt previously issued for a proposal id
    pub fn receipt_for(&self, tx_id: u64) -> Option<&Receipt> {
        self.applied.get(&tx_id)
    }

    fn mint(&mut self, tx_id: u64, account: &Address, amount: u128) -> Result<Receipt, TokenError> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;

        self.total_supply = total_supply;
        *self.balances.entry(account.as_str().to_string()).or_insert(0) += amount;

        Ok(self.record(tx_id, SupplyAction::Mint, account.clone(), amount))
    }

    fn burn(&mut self, tx_id: u64, amount: u128) -> Result<Receipt, TokenError> {
        let treasury = self.treasury.clone();
        let have = self.balance_of(&treasury);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }

        self.balances.insert(treasury.as_str().to_string(), have - amount);
        self.total_supply -= amount;

        Ok(self.record(tx_id, SupplyAction::Burn, treasury, amount))
    }

    fn record(
        &mut self,
        tx_id: u64,
        action: SupplyAction,
        account: Address,
        amount: u128,
    ) -> Receipt {
        let applied_at = Utc::now();
        let hash = hash_fields(&[
            &action.to_string(),
            &tx_id.to_string(),
            account.as_str(),
            &amount.to_string(),
            &applied_at.to_rfc3339(),
        ]);

        let receipt = Receipt {
            tx_id,
            action,
            account: account.clone(),
            amount,
            hash,
            applied_at,
        };
        self.applied.insert(tx_id, receipt.clone());

        // Store event (keep last 100)
        self.history.push(SupplyEvent {
            tx_id,
            action,
            account,
            amount,
            total_supply_after: self.total_supply,
            timestamp: applied_at,
        });
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }

        receipt
    }

    /// Return the stored receipt if `tx_id` was already applied
    fn replay(&self, tx_id: u64, action: SupplyAction) -> Result<Option<Receipt>, LedgerError> {
        match self.applied.get(&tx_id) {
            Some(receipt) if receipt.action == action => Ok(Some(receipt.clone())),
            Some(receipt) => Err(LedgerError::Rejected(format!(
                "proposal {} was already applied as {}",
                tx_id, receipt.action
            ))),
            None => Ok(None),
        }
    }
}

/// Fungible token ledger held in memory
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    /// Errors returned by the next applies, in order
    faults: Mutex<VecDeque<LedgerError>>,
    /// Delay before every apply
    latency: Option<Duration>,
}

impl InMemoryLedger {
    /// Create a ledger with `initial_supply` held by `treasury`
    pub fn new(metadata: TokenMetadata, treasury: Address, initial_supply: u128) -> Self {
        Self::from_state(LedgerState::new(metadata, treasury, initial_supply))
    }

    /// Restore a ledger from persisted state
    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
            faults: Mutex::new(VecDeque::new()),
            latency: None,
        }
    }

    /// Delay every apply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next apply fail with `error` without touching state
    pub fn inject_fault(&self, error: LedgerError) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(error);
    }

    /// Copy of the current state for persistence
    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }

    pub async fn balance_of(&self, address: &Address) -> u128 {
        self.state.read().await.balance_of(address)
    }

    pub async fn total_supply(&self) -> u128 {
        self.state.read().await.total_supply()
    }

    pub async fn treasury(&self) -> Address {
        self.state.read().await.treasury.clone()
    }

    pub async fn history(&self) -> Vec<SupplyEvent> {
        self.state.read().await.history().to_vec()
    }

    async fn before_apply(&self) -> Result<(), LedgerError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let fault = self
            .faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn apply_mint(
        &self,
        tx_id: u64,
        account: &Address,
        amount: u128,
    ) -> Result<Receipt, LedgerError> {
        self.before_apply().await?;

        let mut state = self.state.write().await;
        if let Some(receipt) = state.replay(tx_id, SupplyAction::Mint)? {
            log::info!("Proposal {} already minted, returning original receipt", tx_id);
            return Ok(receipt);
        }

        let receipt = state.mint(tx_id, account, amount)?;
        log::info!(
            "Minted {} {} to {} (supply {})",
            amount,
            state.metadata.symbol,
            account,
            state.total_supply()
        );
        Ok(receipt)
    }

    async fn apply_burn(&self, tx_id: u64, amount: u128) -> Result<Receipt, LedgerError> {
        self.before_apply().await?;

        let mut state = self.state.write().await;
        if let Some(receipt) = state.replay(tx_id, SupplyAction::Burn)? {
            log::info!("Proposal {} already burned, returning original receipt", tx_id);
            return Ok(receipt);
        }

        let receipt = state.burn(tx_id, amount)?;
        log::info!(
            "Burned {} {} from treasury (supply {})",
            amount,
            state.metadata.symbol,
            state.total_supply()
        );
        Ok(receipt)
    }

    async fn query_balance(&self, address: &Address) -> Result<u128, LedgerError> {
        Ok(self.balance_of(address).await)
    }

    async fn token_info(&self) -> Result<TokenInfo, LedgerError> {
        let state = self.state.read().await;
        Ok(TokenInfo {
            name: state.metadata.name.clone(),
            symbol: state.metadata.symbol.clone(),
            decimals: state.metadata.decimals,
            total_supply: state.total_supply(),
        })
    }
}
