//! Multi-signature authorization of supply changes
//!
//! A fixed set of owners must confirm a proposed mint or burn before it may be
//! applied to the ledger. Each proposal is a [`TransactionRecord`] that moves
//! through `Pending`, `Confirmed` (quorum reached) and `Executed`.
//!
//! # Example
//!
//! ```ignore
//! use multisig_engine::multisig::{MultisigEngine, OwnerSet};
//!
//! // 2-of-3 owners
//! let owners = OwnerSet::new(vec!["O1".into(), "O2".into(), "O3".into()], 2)?;
//! let engine = MultisigEngine::new(owners, ledger);
//!
//! let id = engine.submit_burn(50).await?;
//! engine.confirm_transaction(id, "O1").await?;
//! engine.confirm_transaction(id, "O2").await?;
//!
//! // Quorum reached, apply it
//! let execution = engine.execute_transaction(id).await?;
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod record;
pub mod store;
pub mod tracker;

pub use engine::{ConfirmOutcome, Execution, MultisigEngine, DEFAULT_LEDGER_TIMEOUT};
pub use error::{parse_amount, MultisigError};
pub use events::{EngineEvent, EventBus, Subscription};
pub use record::{Confirmation, ProposalStatus, TransactionRecord, TxType};
pub use store::ProposalStore;
pub use tracker::{ConfirmationTracker, OwnerSet};
