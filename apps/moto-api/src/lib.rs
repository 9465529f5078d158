//! # moto-api: HTTP Server for Moto POS
//!
//! JSON API consumed by the shop's web frontend.
//!
//! ## Routes
//! ```text
//! GET    /health
//!
//! GET    /api/products                 list + filters + paging
//! POST   /api/products
//! GET    /api/products/{id}
//! PATCH  /api/products/{id}
//! DELETE /api/products/{id}
//!
//! GET    /api/transactions             history, newest first
//! POST   /api/transactions             checkout
//! GET    /api/transactions/{id}
//! PATCH  /api/transactions/{id}        {"status":"RETURN"} or {"isComplete":..}
//! DELETE /api/transactions/{id}
//!
//! GET    /api/profit?start=&end=
//! GET    /api/dashboard
//! GET    /api/dashboard/low-stock
//! GET    /api/dashboard/best-sellers
//! GET    /api/dashboard/recent-transactions
//!
//! GET    /api/shopdata
//! PATCH  /api/shopdata/{id}
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, products, reports, shop, transactions};

pub use crate::config::ApiConfig;
pub use crate::error::{ApiError, ApiResult};
pub use crate::state::AppState;

/// Builds the router with every route and the request tracing layer.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get_transaction)
                .patch(transactions::patch_transaction)
                .delete(transactions::delete_transaction),
        )
        .route("/profit", get(reports::profit))
        .route("/dashboard", get(reports::summary))
        .route("/dashboard/low-stock", get(reports::low_stock))
        .route("/dashboard/best-sellers", get(reports::best_sellers))
        .route(
            "/dashboard/recent-transactions",
            get(reports::recent_transactions),
        )
        .route("/shopdata", get(shop::get_shop))
        .route("/shopdata/{id}", axum::routing::patch(shop::rename_shop));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
