//! HTTP API for carchain.
//!
//! A thin axum front end over [`SharedLedger`]: request bodies are checked for
//! required fields here, business rules are enforced by the ledger's
//! submission validator, and mining runs on the blocking thread pool with a
//! configurable deadline.

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use carchain_chain::SharedLedger;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared application state passed to handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    /// Deadline for a single mining request.
    pub mining_timeout: Duration,
}

impl AppState {
    pub fn new(ledger: SharedLedger, mining_timeout: Duration) -> Self {
        Self {
            ledger,
            mining_timeout,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/chain", get(routes::get_chain))
        .route("/chain/verify", get(routes::verify_chain))
        .route("/stats", get(routes::get_stats))
        .route("/mine", get(routes::mine_block).post(routes::mine_block))
        .route("/transactions", post(routes::new_transaction))
        .route("/vin/register", post(routes::register_vin))
        .route("/vin/transfer", post(routes::transfer_vin))
        .route("/vin/odometer", post(routes::odometer_update))
        .route("/vin/:vin", get(routes::get_vin_history))
        .route("/vin/:vin/state", get(routes::get_vin_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
