//! # Product Handlers
//!
//! Catalog listing and CRUD under `/api/products`.
//!
//! Every write invalidates the category cache of the brands it touched, so
//! a new category shows up in the filter on the next list request.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use moto_core::catalog::{CreateProductRequest, ProductListParams, UpdateProductRequest};
use moto_core::Product;

use crate::cache::BrandCategories;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Response of `GET /api/products`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Exact count, or `offset + products.len()` when `skipCount=true`.
    pub total_count: i64,
    #[serde(flatten)]
    pub filters: BrandCategories,
    pub pagination: Pagination,
}

fn product_not_found() -> ApiError {
    ApiError::not_found("Product not found")
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductListParams>, QueryRejection>,
) -> ApiResult<Json<ProductPage>> {
    let Query(params) = query?;
    let filter = params.validate()?;
    let repo = state.db.products();

    let products = repo.list(&filter).await?;
    let total_count = if filter.skip_count {
        filter.offset + products.len() as i64
    } else {
        repo.count_matching(&filter).await?
    };

    let filters = match filter.brand {
        Some(brand) => state.categories.get_or_load(brand, &repo).await?,
        None => BrandCategories::default(),
    };

    let has_more = products.len() as i64 == filter.limit;
    Ok(Json(ProductPage {
        products,
        total_count,
        filters,
        pagination: Pagination {
            limit: filter.limit,
            offset: filter.offset,
            has_more,
        },
    }))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(product_not_found)
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(request) = body?;
    let new_product = request.validate()?;

    let product = state.db.products().insert(&new_product).await?;
    state.categories.invalidate(product.brand).await;

    info!(id = %product.id, sku = %product.sku, brand = %product.brand, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /api/products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(request) = body?;
    let changes = request.validate()?;
    let repo = state.db.products();

    let before = repo.get_by_id(&id).await?.ok_or_else(product_not_found)?;
    let product = repo
        .update(&id, &changes)
        .await?
        .ok_or_else(product_not_found)?;

    state.categories.invalidate(before.brand).await;
    if product.brand != before.brand {
        state.categories.invalidate(product.brand).await;
    }

    info!(id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .delete(&id)
        .await?
        .ok_or_else(product_not_found)?;

    state.categories.invalidate(product.brand).await;

    info!(id = %product.id, sku = %product.sku, "Product deleted");
    Ok(Json(product))
}
