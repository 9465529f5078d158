//! # Sale Repository
//!
//! Database operations for sales and sale line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECKOUT (one transaction, CheckoutEngine)                          │
//! │     └── insert_sale()       → Sale { status: SUCCESS }                  │
//! │     └── insert_line_item()  → SaleLineItem (name/price snapshot)        │
//! │     └── insert_line_item()  → ...                                       │
//! │                                                                         │
//! │  2. (OPTIONAL) RETURN (one transaction, ReturnEngine)                   │
//! │     └── update_status(SUCCESS → RETURNED)                               │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                   │
//! │     └── line items go with the header (ON DELETE CASCADE)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use moto_core::checkout::{CartLine, ValidatedCart};
use moto_core::ids::generate_row_id;
use moto_core::{Sale, SaleLineItem, SaleStatus, SaleWithItems};

// =============================================================================
// Unit-of-work Operations
// =============================================================================

/// Inserts a SUCCESS, complete sale header for a validated cart.
pub async fn insert_sale<'e, E>(
    executor: E,
    id: &str,
    cart: &ValidatedCart,
    now: DateTime<Utc>,
) -> DbResult<Sale>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, total = cart.total.rupiah(), "Inserting sale");

    let sale = sqlx::query_as::<_, Sale>(
        r#"
        INSERT INTO sales (
            id, total_amount, payment_amount, change_amount,
            status, is_complete, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
        RETURNING id, total_amount, payment_amount, change_amount,
                  status, is_complete, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(cart.total.rupiah())
    .bind(cart.payment.rupiah())
    .bind(cart.change.rupiah())
    .bind(SaleStatus::Success)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } if field == "sales.id" => {
            DbError::duplicate("id", id)
        }
        other => other,
    })?;

    Ok(sale)
}

/// Records one cart line, freezing the product's name and the charged price.
pub async fn insert_line_item<'e, E>(
    executor: E,
    sale_id: &str,
    line: &CartLine,
    product_name: &str,
    now: DateTime<Utc>,
) -> DbResult<SaleLineItem>
where
    E: SqliteExecutor<'e>,
{
    let item = sqlx::query_as::<_, SaleLineItem>(
        r#"
        INSERT INTO sale_line_items (
            id, sale_id, product_id, product_name, unit_price, quantity, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING id, sale_id, product_id, product_name, unit_price, quantity, created_at
        "#,
    )
    .bind(generate_row_id())
    .bind(sale_id)
    .bind(&line.product_id)
    .bind(product_name)
    .bind(line.unit_price.rupiah())
    .bind(line.quantity)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(item)
}

/// Gets a sale header by id.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, total_amount, payment_amount, change_amount,
               status, is_complete, created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(sale)
}

/// Line items of a sale, ordered by product name.
pub async fn line_items<'e, E>(executor: E, sale_id: &str) -> DbResult<Vec<SaleLineItem>>
where
    E: SqliteExecutor<'e>,
{
    let items = sqlx::query_as::<_, SaleLineItem>(
        r#"
        SELECT id, sale_id, product_id, product_name, unit_price, quantity, created_at
        FROM sale_line_items
        WHERE sale_id = ?1
        ORDER BY product_name ASC, rowid ASC
        "#,
    )
    .bind(sale_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Moves a sale from one status to another.
///
/// Compare-and-set: the row only changes while it still has status `from`.
///
/// ## Returns
/// * `Ok(true)` - Status changed
/// * `Ok(false)` - Sale missing or not in status `from`
pub async fn update_status<'e, E>(
    executor: E,
    id: &str,
    from: SaleStatus,
    to: SaleStatus,
    now: DateTime<Utc>,
) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, ?from, ?to, "Updating sale status");

    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = ?3, updated_at = ?4
        WHERE id = ?1 AND status = ?2
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale reads and maintenance outside checkout/return.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        find_by_id(&self.pool, id).await
    }

    /// Gets a sale with its line items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let items = line_items(&self.pool, id).await?;

        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Most recent sales first, each with its line items.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<SaleWithItems>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, total_amount, payment_amount, change_amount,
                   status, is_complete, created_at, updated_at
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(sales).await
    }

    /// Most recent complete sales first, each with its line items.
    pub async fn recent_complete(&self, limit: i64) -> DbResult<Vec<SaleWithItems>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, total_amount, payment_amount, change_amount,
                   status, is_complete, created_at, updated_at
            FROM sales
            WHERE is_complete = 1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(sales).await
    }

    /// Loads the line items of many sales in one query.
    async fn attach_items(&self, sales: Vec<Sale>) -> DbResult<Vec<SaleWithItems>> {
        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, sale_id, product_id, product_name, unit_price, quantity, created_at \
             FROM sale_line_items WHERE sale_id IN (",
        );
        let mut ids = qb.separated(", ");
        for sale in &sales {
            ids.push_bind(&sale.id);
        }
        ids.push_unseparated(") ORDER BY product_name ASC, rowid ASC");

        let items = qb
            .build_query_as::<SaleLineItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleLineItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }

    /// Sets the completion flag.
    ///
    /// ## Returns
    /// * `Ok(None)` - No sale with that id
    pub async fn set_complete(&self, id: &str, is_complete: bool) -> DbResult<Option<Sale>> {
        debug!(id = %id, is_complete, "Updating sale completion");

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET is_complete = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id, total_amount, payment_amount, change_amount,
                      status, is_complete, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_complete)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Deletes a sale and its line items. Stock is not touched.
    ///
    /// ## Returns
    /// * `Ok(Some(Sale))` - The deleted header
    /// * `Ok(None)` - No sale with that id
    pub async fn delete(&self, id: &str) -> DbResult<Option<Sale>> {
        debug!(id = %id, "Deleting sale");

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            DELETE FROM sales
            WHERE id = ?1
            RETURNING id, total_amount, payment_amount, change_amount,
                      status, is_complete, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use moto_core::checkout::{CartLineInput, CheckoutRequest};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cart() -> ValidatedCart {
        CheckoutRequest::new(
            vec![
                CartLineInput::new("P2", 1, 5_000),
                CartLineInput::new("P1", 2, 10_000),
            ],
            30_000,
        )
        .validate()
        .unwrap()
    }

    async fn record_sale(db: &Database, id: &str, at: DateTime<Utc>) -> Sale {
        let cart = cart();
        let sale = insert_sale(db.pool(), id, &cart, at).await.unwrap();
        insert_line_item(db.pool(), id, &cart.lines[0], "Spion", at)
            .await
            .unwrap();
        insert_line_item(db.pool(), id, &cart.lines[1], "Kampas Rem", at)
            .await
            .unwrap();
        sale
    }

    #[tokio::test]
    async fn test_taken_id_is_reported_as_duplicate_id() {
        let db = test_db().await;
        record_sale(&db, "TRS-00000001", Utc::now()).await;

        let err = insert_sale(db.pool(), "TRS-00000001", &cart(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "id"));
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = test_db().await;
        let sale = record_sale(&db, "TRS-00000001", Utc::now()).await;

        assert_eq!(sale.total_amount, 25_000);
        assert_eq!(sale.change_amount, 5_000);
        assert_eq!(sale.status, SaleStatus::Success);
        assert!(sale.is_complete);
        assert!(find_by_id(db.pool(), "TRS-ffffffff").await.unwrap().is_none());

        let full = db
            .sales()
            .get_with_items("TRS-00000001")
            .await
            .unwrap()
            .unwrap();
        let names: Vec<&str> = full.items.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(names, vec!["Kampas Rem", "Spion"]);
        assert_eq!(full.items[0].quantity, 2);
        assert_eq!(full.items[0].unit_price, 10_000);

        assert!(db.sales().get_with_items("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let db = test_db().await;
        record_sale(&db, "TRS-00000001", Utc::now()).await;

        let now = Utc::now();
        assert!(update_status(
            db.pool(),
            "TRS-00000001",
            SaleStatus::Success,
            SaleStatus::Returned,
            now
        )
        .await
        .unwrap());
        assert!(!update_status(
            db.pool(),
            "TRS-00000001",
            SaleStatus::Success,
            SaleStatus::Returned,
            now
        )
        .await
        .unwrap());

        let sale = db.sales().get_by_id("TRS-00000001").await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Returned);
    }

    #[tokio::test]
    async fn test_recent_lists_are_newest_first() {
        let db = test_db().await;
        let base = Utc::now();
        record_sale(&db, "TRS-00000001", base - Duration::minutes(2)).await;
        record_sale(&db, "TRS-00000002", base - Duration::minutes(1)).await;
        record_sale(&db, "TRS-00000003", base).await;

        db.sales().set_complete("TRS-00000003", false).await.unwrap();

        let recent = db.sales().list_recent(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|s| s.sale.id.as_str()).collect();
        assert_eq!(ids, vec!["TRS-00000003", "TRS-00000002"]);
        assert!(recent.iter().all(|s| s.items.len() == 2));

        let complete = db.sales().recent_complete(5).await.unwrap();
        let ids: Vec<&str> = complete.iter().map(|s| s.sale.id.as_str()).collect();
        assert_eq!(ids, vec!["TRS-00000002", "TRS-00000001"]);
    }

    #[tokio::test]
    async fn test_set_complete_and_delete() {
        let db = test_db().await;
        record_sale(&db, "TRS-00000001", Utc::now()).await;

        let sale = db
            .sales()
            .set_complete("TRS-00000001", false)
            .await
            .unwrap()
            .unwrap();
        assert!(!sale.is_complete);
        assert!(db.sales().set_complete("missing", true).await.unwrap().is_none());

        let deleted = db.sales().delete("TRS-00000001").await.unwrap().unwrap();
        assert_eq!(deleted.total_amount, 25_000);
        assert!(db.sales().delete("TRS-00000001").await.unwrap().is_none());
        assert!(line_items(db.pool(), "TRS-00000001")
            .await
            .unwrap()
            .is_empty());
    }
}
