//! Multisig Engine: multi-owner authorization of token mints and burns
//!
//! Proposals to mint to an account or burn from the treasury are submitted,
//! confirmed by a quorum of a fixed owner set, and then executed exactly once
//! against a token ledger.
//!
//! - Per-proposal locking, so unrelated proposals never contend
//! - Ledger calls bounded by a timeout, with retryable failures
//! - Event subscriptions for lifecycle changes
//! - JSON persistence with atomic writes and backups
//! - CLI and REST/WebSocket API
//!
//! # Example
//!
//! ```rust
//! use multisig_engine::ledger::{Address, InMemoryLedger, TokenMetadata};
//! use multisig_engine::multisig::{MultisigEngine, OwnerSet};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let metadata = TokenMetadata::new("Carbon Token".into(), "CO2".into(), 18).unwrap();
//! let treasury = Address::parse("0x00000000000000000000000000000000000000aa").unwrap();
//! let ledger = Arc::new(InMemoryLedger::new(metadata, treasury, 1_000));
//!
//! let owners = OwnerSet::new(vec!["alice".into(), "bob".into(), "carol".into()], 2).unwrap();
//! let engine = MultisigEngine::new(owners, ledger.clone());
//!
//! let id = engine.submit_burn(50).await.unwrap();
//! engine.confirm_transaction(id, "alice").await.unwrap();
//! engine.confirm_transaction(id, "bob").await.unwrap();
//! engine.execute_transaction(id).await.unwrap();
//!
//! assert_eq!(ledger.total_supply().await, 950);
//! # });
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::{ConfigError, EngineConfig, TokenConfig};
pub use ledger::{Address, InMemoryLedger, Ledger, LedgerError, Receipt, TokenInfo};
pub use multisig::{
    EngineEvent, MultisigEngine, MultisigError, OwnerSet, Subscription, TransactionRecord, TxType,
};
pub use storage::{Storage, StorageConfig};
