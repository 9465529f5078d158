//! # Category Cache
//!
//! Per-brand category and master-category lists for the catalog filters.
//!
//! ```text
//! GET /api/products?brand=HONDA
//!      │
//!      ▼
//! ┌──────────────────────────┐   fresh (age < ttl)   ┌───────────────────┐
//! │ CategoryCache::get_or_load├──────────────────────►│ cached lists      │
//! └────────────┬─────────────┘                        └───────────────────┘
//!              │ missing / stale
//!              ▼
//!   SELECT DISTINCT category, master_category ... WHERE brand = ?
//!              │
//!              ▼
//!        store with timestamp
//!
//! POST/PATCH/DELETE /api/products → invalidate(brand)
//! ```
//!
//! Read-through only. Checkout and returns never touch it since they do not
//! change category labels.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use moto_core::Brand;
use moto_db::{DbResult, ProductRepository};

/// The two filter lists of one brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCategories {
    pub categories: Vec<String>,
    pub master_categories: Vec<String>,
}

#[derive(Debug)]
struct Entry {
    lists: BrandCategories,
    loaded_at: Instant,
}

/// Shared, cloneable cache handle.
#[derive(Debug, Clone)]
pub struct CategoryCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<Brand, Entry>>>,
}

impl CategoryCache {
    pub fn new(ttl: Duration) -> Self {
        CategoryCache {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Cached lists for `brand`, if present and younger than the TTL.
    pub async fn get(&self, brand: Brand) -> Option<BrandCategories> {
        let entries = self.entries.read().await;
        entries
            .get(&brand)
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| entry.lists.clone())
    }

    pub async fn insert(&self, brand: Brand, lists: BrandCategories) {
        self.entries.write().await.insert(
            brand,
            Entry {
                lists,
                loaded_at: Instant::now(),
            },
        );
    }

    /// Returns the cached lists, loading them from the catalog when missing
    /// or stale.
    pub async fn get_or_load(
        &self,
        brand: Brand,
        products: &ProductRepository,
    ) -> DbResult<BrandCategories> {
        if let Some(lists) = self.get(brand).await {
            return Ok(lists);
        }

        debug!(%brand, "Category cache miss");
        let lists = BrandCategories {
            categories: products.categories(brand).await?,
            master_categories: products.master_categories(brand).await?,
        };
        self.insert(brand, lists.clone()).await;

        Ok(lists)
    }

    /// Drops the entry of `brand` so the next read reloads it.
    pub async fn invalidate(&self, brand: Brand) {
        if self.entries.write().await.remove(&brand).is_some() {
            debug!(%brand, "Category cache invalidated");
        }
    }
}
