//! Shared application state handed to every handler.

use moto_db::Database;

use crate::cache::CategoryCache;
use crate::config::ApiConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub categories: CategoryCache,
    /// Profit per unit when a product's buy price is unknown.
    pub fallback_margin: i64,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        AppState {
            db,
            categories: CategoryCache::new(config.category_cache_ttl),
            fallback_margin: config.fallback_margin,
        }
    }
}
