//! # Shop Handlers
//!
//! The single shop record under `/api/shopdata`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use moto_core::validation::validate_store_name;
use moto_core::ShopData;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub data: ShopData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameShopRequest {
    #[serde(default)]
    pub store_name: Option<String>,
}

/// `GET /api/shopdata`
pub async fn get_shop(State(state): State<AppState>) -> ApiResult<Json<ShopResponse>> {
    let data = state.db.shop().get_or_create().await?;
    Ok(Json(ShopResponse { data }))
}

/// `PATCH /api/shopdata/{id}`
pub async fn rename_shop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RenameShopRequest>, JsonRejection>,
) -> ApiResult<Json<ShopData>> {
    let Json(request) = body?;
    let name = request.store_name.ok_or_else(ApiError::invalid_body)?;
    let name = validate_store_name(&name)?;

    let shop = state
        .db
        .shop()
        .rename(&id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Shop not found"))?;

    info!(id = %shop.id, name = %shop.name, "Shop renamed");
    Ok(Json(shop))
}
