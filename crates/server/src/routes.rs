//! Request handlers.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use carchain_chain::LedgerStats;
use carchain_consensus::CancelToken;
use carchain_core::{Block, Transaction, VinState};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

type ApiResult<T> = Result<T, ApiError>;

/// A block as served by the API, with its computed hash.
#[derive(Debug, Serialize)]
pub struct BlockView<'a> {
    #[serde(flatten)]
    pub block: &'a Block,
    pub hash: String,
}

impl<'a> From<&'a Block> for BlockView<'a> {
    fn from(block: &'a Block) -> Self {
        Self {
            block,
            hash: block.hash_hex(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    vin: Option<String>,
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    vin: Option<String>,
    from_owner: Option<String>,
    to_owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OdometerRequest {
    vin: Option<String>,
    mileage: Option<f64>,
}

/// Collect the names of absent fields into one malformed-request error.
fn require_fields(fields: &[(&str, bool)]) -> ApiResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::malformed(format!("Missing fields: {}", missing.join(", "))))
    }
}

/// Validate and pool a transaction, answering with its pending height.
fn submit(state: &AppState, tx: Transaction, message: &str) -> ApiResult<(StatusCode, Json<Value>)> {
    let height = state.ledger.submit(tx)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "will_be_added_to_block": height,
        })),
    ))
}

/// GET /
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "CarChain API is running" }))
}

/// GET /chain
pub async fn get_chain(State(state): State<AppState>) -> Json<Value> {
    let chain = state.ledger.chain();
    let views: Vec<BlockView<'_>> = chain.iter().map(BlockView::from).collect();
    Json(json!({
        "length": chain.len(),
        "chain": views,
    }))
}

/// GET /chain/verify
pub async fn verify_chain(State(state): State<AppState>) -> Json<Value> {
    let length = state.ledger.len();
    match state.ledger.verify() {
        Ok(()) => Json(json!({ "valid": true, "length": length })),
        Err(e) => Json(json!({ "valid": false, "length": length, "error": e.to_string() })),
    }
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<LedgerStats>> {
    Ok(Json(state.ledger.stats()?))
}

/// POST /transactions
pub async fn new_transaction(
    State(state): State<AppState>,
    body: Result<Json<Transaction>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(tx) = body?;
    submit(&state, tx, "Transaction added to pending transactions")
}

/// POST /vin/register
pub async fn register_vin(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;
    require_fields(&[("vin", req.vin.is_some()), ("owner", req.owner.is_some())])?;

    let tx = Transaction::register(req.vin.unwrap_or_default(), req.owner.unwrap_or_default());
    submit(&state, tx, "VIN registration added to pending transactions")
}

/// POST /vin/transfer
pub async fn transfer_vin(
    State(state): State<AppState>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;
    require_fields(&[
        ("vin", req.vin.is_some()),
        ("from_owner", req.from_owner.is_some()),
        ("to_owner", req.to_owner.is_some()),
    ])?;

    let tx = Transaction::transfer(
        req.vin.unwrap_or_default(),
        req.from_owner.unwrap_or_default(),
        req.to_owner.unwrap_or_default(),
    );
    submit(&state, tx, "Ownership transfer added to pending transactions")
}

/// POST /vin/odometer
pub async fn odometer_update(
    State(state): State<AppState>,
    body: Result<Json<OdometerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;
    require_fields(&[("vin", req.vin.is_some()), ("mileage", req.mileage.is_some())])?;

    let tx = Transaction::odometer(req.vin.unwrap_or_default(), req.mileage.unwrap_or_default());
    submit(&state, tx, "Odometer update added to pending transactions")
}

/// Cancels the nonce search if the request is dropped before it finishes.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// GET|POST /mine
pub async fn mine_block(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let token = CancelToken::with_timeout(state.mining_timeout);
    let _guard = CancelOnDrop(token.clone());
    let ledger = state.ledger.clone();

    let block = tokio::task::spawn_blocking(move || ledger.mine(&token))
        .await
        .map_err(|e| ApiError::Internal(format!("mining task failed: {e}")))??;

    let hash = block.hash_hex();
    info!(height = block.height, hash = %hash, "block mined");

    Ok(Json(json!({
        "message": "Block mined successfully!",
        "height": block.height,
        "transactions": block.transactions,
        "nonce": block.nonce,
        "previous_hash": block.previous_hash,
        "hash": hash,
    })))
}

/// GET /vin/:vin
pub async fn get_vin_history(State(state): State<AppState>, Path(vin): Path<String>) -> Json<Value> {
    let history = state.ledger.vin_history(&vin);
    Json(json!({
        "vin": vin,
        "records_found": history.len(),
        "history": history,
    }))
}

/// GET /vin/:vin/state
pub async fn get_vin_state(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Json<VinState> {
    Json(state.ledger.latest_vin_state(&vin))
}
