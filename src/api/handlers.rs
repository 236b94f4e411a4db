//! REST API handlers for multisig operations

use crate::ledger::{Address, InMemoryLedger, TokenInfo};
use crate::multisig::{
    parse_amount, ConfirmOutcome, Execution, MultisigEngine, MultisigError, ProposalStatus,
    TransactionRecord,
};
use crate::storage::{Storage, StorageError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<MultisigEngine>,
    pub ledger: Arc<InMemoryLedger>,
    pub storage: Arc<Storage>,
    /// Serialises writes to the data directory
    save_lock: Arc<Mutex<()>>,
}

impl ApiState {
    pub fn new(
        engine: Arc<MultisigEngine>,
        ledger: Arc<InMemoryLedger>,
        storage: Arc<Storage>,
    ) -> Self {
        Self {
            engine,
            ledger,
            storage,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write proposal records and ledger state to disk
    pub async fn persist(&self) -> Result<(), StorageError> {
        let _guard = self.save_lock.lock().await;
        let records = self.engine.snapshot().await;
        let ledger = self.ledger.snapshot().await;

        self.storage.save_proposals(&records)?;
        self.storage.save_ledger(&ledger)?;
        Ok(())
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub kind: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Amounts travel as decimal strings in both directions so large values
/// survive JSON clients
#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub account: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct BurnRequest {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub owner: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub status: ProposalStatus,
    pub quorum: usize,
}

impl TransactionResponse {
    fn new(record: TransactionRecord, quorum: usize) -> Self {
        Self {
            status: record.status(quorum),
            record,
            quorum,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub info: TokenInfo,
    pub treasury: Address,
    pub holders: usize,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    #[serde(with = "crate::ledger::serdes::amount")]
    pub balance: u128,
}

#[derive(Debug, Serialize)]
pub struct OwnersResponse {
    pub owners: Vec<String>,
    pub quorum: usize,
    pub description: String,
}

// ============================================================================
// Error mapping
// ============================================================================

fn status_for(err: &MultisigError) -> StatusCode {
    match err {
        MultisigError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        MultisigError::NotFound(_) => StatusCode::NOT_FOUND,
        MultisigError::UnknownOwner(_) => StatusCode::FORBIDDEN,
        MultisigError::AlreadyExecuted(_) | MultisigError::QuorumNotMet { .. } => {
            StatusCode::CONFLICT
        }
        MultisigError::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        MultisigError::LedgerRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn engine_error(err: MultisigError) -> (StatusCode, Json<ApiError>) {
    (
        status_for(&err),
        Json(ApiError {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }),
    )
}

fn storage_error(err: StorageError) -> (StatusCode, Json<ApiError>) {
    log::error!("Failed to persist state: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: format!("Failed to persist state: {}", err),
            kind: "storage".to_string(),
        }),
    )
}

// ============================================================================
// Transaction Handlers
// ============================================================================

pub async fn list_transactions(State(state): State<ApiState>) -> Json<Vec<TransactionResponse>> {
    let quorum = state.engine.quorum();
    let records = state.engine.list_transactions().await;
    Json(
        records
            .into_iter()
            .map(|record| TransactionResponse::new(record, quorum))
            .collect(),
    )
}

pub async fn list_pending(State(state): State<ApiState>) -> Json<Vec<TransactionResponse>> {
    let quorum = state.engine.quorum();
    let records = state.engine.get_pending().await;
    Json(
        records
            .into_iter()
            .map(|record| TransactionResponse::new(record, quorum))
            .collect(),
    )
}

pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> ApiResult<TransactionResponse> {
    let record = state.engine.get_transaction(id).await.map_err(engine_error)?;
    Ok(Json(TransactionResponse::new(record, state.engine.quorum())))
}

pub async fn submit_mint(
    State(state): State<ApiState>,
    Json(req): Json<MintRequest>,
) -> ApiResult<TransactionResponse> {
    let amount = parse_amount(&req.amount).map_err(engine_error)?;
    let id = state
        .engine
        .submit_mint(&req.account, amount)
        .await
        .map_err(engine_error)?;
    state.persist().await.map_err(storage_error)?;

    let record = state.engine.get_transaction(id).await.map_err(engine_error)?;
    Ok(Json(TransactionResponse::new(record, state.engine.quorum())))
}

pub async fn submit_burn(
    State(state): State<ApiState>,
    Json(req): Json<BurnRequest>,
) -> ApiResult<TransactionResponse> {
    let amount = parse_amount(&req.amount).map_err(engine_error)?;
    let id = state.engine.submit_burn(amount).await.map_err(engine_error)?;
    state.persist().await.map_err(storage_error)?;

    let record = state.engine.get_transaction(id).await.map_err(engine_error)?;
    Ok(Json(TransactionResponse::new(record, state.engine.quorum())))
}

pub async fn confirm_transaction(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<ConfirmOutcome> {
    let outcome = state
        .engine
        .confirm_transaction(id, &req.owner)
        .await
        .map_err(engine_error)?;
    if outcome.newly_confirmed {
        state.persist().await.map_err(storage_error)?;
    }
    Ok(Json(outcome))
}

pub async fn execute_transaction(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> ApiResult<Execution> {
    let result = state.engine.execute_transaction(id).await;
    state.persist().await.map_err(storage_error)?;
    result.map(Json).map_err(engine_error)
}

// ============================================================================
// Ledger Handlers
// ============================================================================

pub async fn get_token(State(state): State<ApiState>) -> ApiResult<TokenResponse> {
    let info = state.engine.token_info().await.map_err(engine_error)?;
    let snapshot = state.ledger.snapshot().await;

    Ok(Json(TokenResponse {
        info,
        treasury: snapshot.treasury.clone(),
        holders: snapshot.holder_count(),
    }))
}

pub async fn get_balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<BalanceResponse> {
    let balance = state
        .engine
        .query_balance(&address)
        .await
        .map_err(engine_error)?;

    Ok(Json(BalanceResponse {
        address: address.to_lowercase(),
        balance,
    }))
}

pub async fn get_owners(State(state): State<ApiState>) -> Json<OwnersResponse> {
    let owners = state.engine.owners();
    Json(OwnersResponse {
        owners: owners.owners().to_vec(),
        quorum: owners.quorum(),
        description: owners.description(),
    })
}

pub async fn health_check() -> &'static str {
    "OK"
}
