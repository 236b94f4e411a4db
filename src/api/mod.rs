//! REST API module
//!
//! HTTP access to the multisig engine.
//!
//! # Endpoints
//!
//! ## Transactions
//! - `GET /api/transactions` - All proposals
//! - `GET /api/transactions/pending` - Unexecuted proposals
//! - `GET /api/transactions/{id}` - One proposal
//! - `POST /api/transactions/mint` - Propose a mint `{account, amount}`
//! - `POST /api/transactions/burn` - Propose a burn `{amount}`
//! - `POST /api/transactions/{id}/confirm` - Confirm `{owner}`
//! - `POST /api/transactions/{id}/execute` - Apply to the ledger
//!
//! ## Ledger
//! - `GET /api/token` - Token details
//! - `GET /api/balance/{address}` - Account balance
//! - `GET /api/owners` - Owner set and quorum
//!
//! ## WebSocket
//! - `GET /ws` - Engine events (Submitted, Confirmed, Executed, ExecutionFailed)

pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::ApiState;
pub use routes::create_router;
