//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket event stream
        .route("/ws", get(ws_handler))
        // Transactions
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/transactions/pending", get(handlers::list_pending))
        .route("/api/transactions/mint", post(handlers::submit_mint))
        .route("/api/transactions/burn", post(handlers::submit_burn))
        .route("/api/transactions/{id}", get(handlers::get_transaction))
        .route(
            "/api/transactions/{id}/confirm",
            post(handlers::confirm_transaction),
        )
        .route(
            "/api/transactions/{id}/execute",
            post(handlers::execute_transaction),
        )
        // Ledger
        .route("/api/token", get(handlers::get_token))
        .route("/api/balance/{address}", get(handlers::get_balance))
        .route("/api/owners", get(handlers::get_owners))
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
