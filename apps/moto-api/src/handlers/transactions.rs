//! # Transaction Handlers
//!
//! Checkout, history, returns and maintenance under `/api/transactions`.
//!
//! ```text
//! POST   /api/transactions          → CheckoutEngine   201 sale + items
//! PATCH  /api/transactions/{id}
//!          {"status":"RETURN"}      → ReturnEngine     200 sale + items
//!          {"isComplete":false}     → flag update      200 sale + items
//! DELETE /api/transactions/{id}     → delete, no restock
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use moto_core::checkout::CheckoutRequest;
use moto_core::{Sale, SaleWithItems, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Status values that trigger a return, matched exactly. `RETUR` is what
/// older frontends send. Anything else is a plain field update.
const RETURN_STATUSES: [&str; 2] = ["RETURN", "RETUR"];

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
}

impl HistoryParams {
    fn limit(&self) -> Result<i64, ValidationError> {
        match self.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map(|n| n.clamp(1, MAX_HISTORY_LIMIT))
                .map_err(|_| ValidationError::invalid("limit", "must be a whole number")),
            None => Ok(DEFAULT_HISTORY_LIMIT),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionList {
    pub transactions: Vec<SaleWithItems>,
}

/// Body of `PATCH /api/transactions/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTransactionRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_complete: Option<bool>,
    /// Only present to be refused.
    #[serde(default)]
    pub total_amount: Option<serde_json::Value>,
}

impl PatchTransactionRequest {
    fn is_return(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| RETURN_STATUSES.contains(&status))
    }
}

fn transaction_not_found() -> ApiError {
    ApiError::not_found("Transaction not found")
}

/// `GET /api/transactions?limit=N`
pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<Json<TransactionList>> {
    let Query(params) = query?;
    let transactions = state.db.sales().list_recent(params.limit()?).await?;
    Ok(Json(TransactionList { transactions }))
}

/// `POST /api/transactions`
pub async fn create_transaction(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleWithItems>)> {
    let Json(request) = body?;
    let sale = state.db.checkout().checkout(&request).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /api/transactions/{id}`
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleWithItems>> {
    state
        .db
        .sales()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(transaction_not_found)
}

/// `PATCH /api/transactions/{id}`
pub async fn patch_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PatchTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<SaleWithItems>> {
    let Json(request) = body?;

    if request.is_return() {
        let sale = state.db.returns().return_sale(&id).await?;
        return Ok(Json(sale));
    }

    if request.total_amount.is_some() {
        return Err(ValidationError::Immutable {
            field: "totalAmount".to_string(),
        }
        .into());
    }

    let sales = state.db.sales();
    if let Some(is_complete) = request.is_complete {
        sales
            .set_complete(&id, is_complete)
            .await?
            .ok_or_else(transaction_not_found)?;
        info!(sale_id = %id, is_complete, "Transaction updated");
    }

    sales
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(transaction_not_found)
}

/// `DELETE /api/transactions/{id}`
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    let sale = state
        .db
        .sales()
        .delete(&id)
        .await?
        .ok_or_else(transaction_not_found)?;

    info!(sale_id = %sale.id, status = ?sale.status, "Transaction deleted");
    Ok(Json(sale))
}
