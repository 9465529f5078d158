//! # Report Handlers
//!
//! Profit chart and dashboard widgets. All read-only.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use moto_core::report::{DailyProfit, DateRange};
use moto_core::{BestSeller, DashboardSummary, Product, SaleWithItems};

use crate::error::ApiResult;
use crate::state::AppState;

/// Rows shown by each dashboard list.
pub const DASHBOARD_LIST_SIZE: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct ProfitParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReport {
    pub grouped_data: Vec<DailyProfit>,
}

#[derive(Debug, Serialize)]
pub struct ProductList<T> {
    pub products: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct RecentTransactions {
    pub transactions: Vec<SaleWithItems>,
}

/// `GET /api/profit?start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn profit(
    State(state): State<AppState>,
    query: Result<Query<ProfitParams>, QueryRejection>,
) -> ApiResult<Json<ProfitReport>> {
    let Query(params) = query?;
    let range = DateRange::parse(params.start.as_deref(), params.end.as_deref())?;

    let grouped_data = state
        .db
        .reports()
        .daily_profit(&range, state.fallback_margin)
        .await?;

    Ok(Json(ProfitReport { grouped_data }))
}

/// `GET /api/dashboard`
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.db.reports().dashboard_summary().await?))
}

/// `GET /api/dashboard/low-stock`
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<ProductList<Product>>> {
    let products = state.db.products().low_stock(DASHBOARD_LIST_SIZE).await?;
    Ok(Json(ProductList { products }))
}

/// `GET /api/dashboard/best-sellers`
pub async fn best_sellers(
    State(state): State<AppState>,
) -> ApiResult<Json<ProductList<BestSeller>>> {
    let products = state.db.reports().best_sellers(DASHBOARD_LIST_SIZE).await?;
    Ok(Json(ProductList { products }))
}

/// `GET /api/dashboard/recent-transactions`
pub async fn recent_transactions(
    State(state): State<AppState>,
) -> ApiResult<Json<RecentTransactions>> {
    let transactions = state.db.sales().recent_complete(DASHBOARD_LIST_SIZE).await?;
    Ok(Json(RecentTransactions { transactions }))
}
