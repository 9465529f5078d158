//! # Return Engine
//!
//! Reverses a sale: marks it RETURNED and puts its quantities back on the
//! shelf in the same transaction.
//!
//! ```text
//! ┌─ transaction ─────────────────────────────────────────────────────────┐
//! │ UPDATE sales SET status = returned WHERE id = ? AND status = success  │
//! │    0 rows → sale missing   → SaleNotFound     (rollback)              │
//! │           → sale returned  → AlreadyReturned  (rollback)              │
//! │ for item in line items:                                               │
//! │    stock += quantity         (product deleted → warn, skip)           │
//! └─ COMMIT ──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status flip comes first so a concurrent second return blocks on the
//! write lock and then finds the sale already RETURNED.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::EngineResult;
use crate::error::DbError;
use crate::repository::{product, sale};
use moto_core::validation::validate_id;
use moto_core::{CoreError, SaleStatus, SaleWithItems};

#[derive(Debug, Clone)]
pub struct ReturnEngine {
    pool: SqlitePool,
}

impl ReturnEngine {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnEngine { pool }
    }

    /// Returns a sale and restores the stock of each of its lines.
    ///
    /// ## Errors
    /// * `SaleNotFound` - No sale with that id
    /// * `AlreadyReturned` - The sale was returned before; nothing is restocked
    pub async fn return_sale(&self, sale_id: &str) -> EngineResult<SaleWithItems> {
        let sale_id = validate_id("id", sale_id)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let flipped = sale::update_status(
            &mut *tx,
            &sale_id,
            SaleStatus::Success,
            SaleStatus::Returned,
            now,
        )
        .await?;

        if !flipped {
            return match sale::find_by_id(&mut *tx, &sale_id).await? {
                None => Err(CoreError::SaleNotFound(sale_id).into()),
                Some(_) => Err(CoreError::AlreadyReturned(sale_id).into()),
            };
        }

        let items = sale::line_items(&mut *tx, &sale_id).await?;
        let mut restocked = 0usize;
        for item in &items {
            if product::increment_stock(&mut *tx, &item.product_id, item.quantity).await? {
                restocked += 1;
            } else {
                warn!(
                    sale_id = %sale_id,
                    product_id = %item.product_id,
                    product_name = %item.product_name,
                    quantity = item.quantity,
                    "Product no longer exists, skipping restock"
                );
            }
        }

        let header = sale::find_by_id(&mut *tx, &sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id.as_str()))?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            items = items.len(),
            restocked,
            "Sale returned"
        );

        Ok(SaleWithItems {
            sale: header,
            items,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
