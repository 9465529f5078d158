//! # Checkout Engine
//!
//! Records a sale and takes its quantities off the shelf, all or nothing.
//!
//! ## Flow
//! ```text
//! CheckoutRequest
//!      │ validate()                       → ValidationError (no writes)
//!      ▼
//! draw sale id ◄──────────────────────────────────┐ taken id (≤ 5 draws,
//!      │                                           │  then IdGenerationFailed)
//!      ▼                                           │
//! ┌─ transaction ─────────────────────────────────────────────────────────┐
//! │ INSERT sale                          ────────────┘                    │
//! │ for line in cart:                                                     │
//! │     product = find_by_id             → ProductNotFound   (rollback)   │
//! │     decrement_stock (stock >= qty)   → InsufficientStock (rollback)   │
//! │     INSERT line item (name, price snapshot)                           │
//! └─ COMMIT ──────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{EngineError, EngineResult};
use crate::error::DbError;
use crate::repository::{product, sale};
use moto_core::checkout::{CheckoutRequest, ValidatedCart};
use moto_core::ids::generate_sale_id;
use moto_core::{CoreError, SaleWithItems, MAX_SALE_ID_ATTEMPTS};

#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
    id_generator: fn() -> String,
}

impl CheckoutEngine {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutEngine {
            pool,
            id_generator: generate_sale_id,
        }
    }

    /// Replaces the sale id source.
    pub fn with_id_generator(mut self, id_generator: fn() -> String) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Validates the request and records the sale.
    pub async fn checkout(&self, request: &CheckoutRequest) -> EngineResult<SaleWithItems> {
        let cart = request.validate()?;
        self.checkout_cart(&cart).await
    }

    /// Records a sale for an already validated cart.
    ///
    /// A freshly drawn sale id that is already taken makes the INSERT fail
    /// on the primary key; that attempt is rolled back and a new id drawn,
    /// at most `MAX_SALE_ID_ATTEMPTS` times. Line items come back in cart
    /// order.
    pub async fn checkout_cart(&self, cart: &ValidatedCart) -> EngineResult<SaleWithItems> {
        for attempt in 1..=MAX_SALE_ID_ATTEMPTS {
            let sale_id = (self.id_generator)();
            match self.record_sale(&sale_id, cart).await {
                Err(EngineError::Storage(DbError::UniqueViolation { ref field, .. }))
                    if field == "id" =>
                {
                    debug!(sale_id = %sale_id, attempt, "Sale id collision, drawing again");
                }
                result => return result,
            }
        }

        Err(CoreError::IdGenerationFailed {
            attempts: MAX_SALE_ID_ATTEMPTS,
        }
        .into())
    }

    /// One transaction: header, then per line lookup, decrement, line item.
    async fn record_sale(&self, sale_id: &str, cart: &ValidatedCart) -> EngineResult<SaleWithItems> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let header = sale::insert_sale(&mut *tx, sale_id, cart, now).await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let product = product::find_by_id(&mut *tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            // the conditional decrement is what holds under concurrency
            if !product.can_sell(line.quantity)
                || !product::decrement_stock(&mut *tx, &product.id, line.quantity).await?
            {
                debug!(
                    product_id = %product.id,
                    available = product.stock,
                    requested = line.quantity,
                    "Checkout rejected"
                );
                return Err(CoreError::InsufficientStock {
                    product_name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            items.push(sale::insert_line_item(&mut *tx, sale_id, line, &product.name, now).await?);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            total = %cart.total,
            payment = %cart.payment,
            items = items.len(),
            "Sale created"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use moto_core::catalog::NewProduct;
    use moto_core::checkout::CartLineInput;
    use moto_core::{Brand, SaleStatus, ValidationError};

    async fn db_with_stock(stock: &[(&str, &str, i64)]) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (id, name, qty) in stock {
            db.products()
                .insert(&NewProduct {
                    id: id.to_string(),
                    name: name.to_string(),
                    brand: Brand::Honda,
                    category: "Rem".to_string(),
                    master_category: "Pengereman".to_string(),
                    sku: format!("HON-{}", id),
                    buy_price: 6_000,
                    sell_price: 10_000,
                    stock: *qty,
                    image_url: None,
                })
                .await
                .unwrap();
        }
        db
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    async fn sale_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock_and_records_sale() {
        let db = db_with_stock(&[("P1", "Kampas Rem Depan", 5), ("P2", "Minyak Rem", 3)]).await;

        let request = CheckoutRequest::new(
            vec![
                CartLineInput::new("P1", 2, 10_000),
                CartLineInput::new("P2", 1, 5_000),
            ],
            30_000,
        );
        let result = db.checkout().checkout(&request).await.unwrap();

        assert!(result.sale.id.starts_with("TRS-"));
        assert_eq!(result.sale.total_amount, 25_000);
        assert_eq!(result.sale.payment_amount, 30_000);
        assert_eq!(result.sale.change_amount, 5_000);
        assert_eq!(result.sale.status, SaleStatus::Success);
        assert!(result.sale.is_complete);

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].product_name, "Kampas Rem Depan");
        assert_eq!(result.items[0].unit_price, 10_000);
        assert_eq!(result.items[1].quantity, 1);

        assert_eq!(stock_of(&db, "P1").await, 3);
        assert_eq!(stock_of(&db, "P2").await, 2);

        let stored = db
            .sales()
            .get_with_items(&result.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.sale, result.sale);
        assert_eq!(stored.items.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = db_with_stock(&[("P1", "Kampas Rem Depan", 5), ("P2", "Minyak Rem", 3)]).await;

        // first line succeeds inside the transaction before the second fails
        let request = CheckoutRequest::new(
            vec![
                CartLineInput::new("P2", 1, 5_000),
                CartLineInput::new("P1", 10, 10_000),
            ],
            0,
        );
        let err = db.checkout().checkout(&request).await.unwrap_err();

        assert_eq!(err.to_string(), "Insufficient stock for Kampas Rem Depan");
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InsufficientStock {
                available: 5,
                requested: 10,
                ..
            })
        ));
        assert_eq!(stock_of(&db, "P1").await, 5);
        assert_eq!(stock_of(&db, "P2").await, 3);
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_same_product_twice_counts_against_one_shelf() {
        let db = db_with_stock(&[("P1", "Busi", 3)]).await;

        let request = CheckoutRequest::new(
            vec![
                CartLineInput::new("P1", 2, 10_000),
                CartLineInput::new("P1", 2, 10_000),
            ],
            40_000,
        );
        let err = db.checkout().checkout(&request).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InsufficientStock { available: 1, .. })
        ));
        assert_eq!(stock_of(&db, "P1").await, 3);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = db_with_stock(&[("P1", "Busi", 3)]).await;

        let request = CheckoutRequest::new(
            vec![
                CartLineInput::new("P1", 1, 10_000),
                CartLineInput::new("PRD-deadbeef", 1, 10_000),
            ],
            20_000,
        );
        let err = db.checkout().checkout(&request).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Core(CoreError::ProductNotFound(ref id)) if id == "PRD-deadbeef"
        ));
        assert_eq!(stock_of(&db, "P1").await, 3);
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_writing() {
        let db = db_with_stock(&[]).await;

        let err = db
            .checkout()
            .checkout(&CheckoutRequest::new(vec![], 10_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::EmptyCart))
        ));
        assert_eq!(sale_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_underpayment_is_not_enforced() {
        let db = db_with_stock(&[("P1", "Busi", 3)]).await;

        let result = db
            .checkout()
            .checkout(&CheckoutRequest::new(
                vec![CartLineInput::new("P1", 1, 10_000)],
                2_000,
            ))
            .await
            .unwrap();
        assert_eq!(result.sale.payment_amount, 2_000);
        assert_eq!(result.sale.change_amount, 0);
    }

    #[tokio::test]
    async fn test_id_generation_gives_up_after_max_attempts() {
        fn fixed_id() -> String {
            "TRS-00000001".to_string()
        }

        let db = db_with_stock(&[("P1", "Busi", 10)]).await;
        let engine = db.checkout().with_id_generator(fixed_id);
        let request = CheckoutRequest::new(vec![CartLineInput::new("P1", 1, 10_000)], 10_000);

        engine.checkout(&request).await.unwrap();
        let err = engine.checkout(&request).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Core(CoreError::IdGenerationFailed { attempts }) if attempts == MAX_SALE_ID_ATTEMPTS
        ));
        assert_eq!(stock_of(&db, "P1").await, 9);
    }

    #[tokio::test]
    async fn test_taken_sale_id_is_redrawn() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DRAWS: AtomicUsize = AtomicUsize::new(0);
        fn taken_then_fresh() -> String {
            match DRAWS.fetch_add(1, Ordering::SeqCst) {
                0 => "TRS-0000000a".to_string(),
                _ => "TRS-0000000b".to_string(),
            }
        }

        let db = db_with_stock(&[("P1", "Busi", 10)]).await;
        let request = CheckoutRequest::new(vec![CartLineInput::new("P1", 1, 10_000)], 10_000);

        // occupy the id the generator hands out first
        db.checkout()
            .with_id_generator(|| "TRS-0000000a".to_string())
            .checkout(&request)
            .await
            .unwrap();

        let result = db
            .checkout()
            .with_id_generator(taken_then_fresh)
            .checkout(&request)
            .await
            .unwrap();

        assert_eq!(result.sale.id, "TRS-0000000b");
        assert_eq!(DRAWS.load(Ordering::SeqCst), 2);
        assert_eq!(sale_count(&db).await, 2);
        assert_eq!(stock_of(&db, "P1").await, 8);
    }
}
