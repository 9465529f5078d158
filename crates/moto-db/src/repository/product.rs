//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Catalog listing with brand/category/search filters
//! - CRUD operations
//! - Stock movements used by checkout and returns
//!
//! ## Two Calling Styles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductRepository (owns a pool clone)                                  │
//! │    db.products().list(&filter)        one statement, any connection     │
//! │                                                                         │
//! │  Free functions (generic over the executor)                             │
//! │    product::find_by_id(&mut *tx, id)  inside a checkout/return          │
//! │    product::decrement_stock(&mut *tx, id, qty)                          │
//! │    product::increment_stock(&mut *tx, id, qty)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conditional Decrement
//! ```text
//! UPDATE products SET stock = stock - 3 WHERE id = 'P1' AND stock >= 3
//!
//!   stock 5 → 1 row affected, stock 2
//!   stock 2 → 0 rows affected, nothing written → InsufficientStock
//! ```
//! The stock check and the write are the same statement, so two checkouts
//! racing for the last unit cannot both win.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use moto_core::catalog::{NewProduct, ProductChanges, ProductFilter};
use moto_core::{Brand, Product, LOW_STOCK_THRESHOLD};

const PRODUCT_COLUMNS: &str = "id, name, brand, category, master_category, sku, buy_price, \
     sell_price, stock, image_url, created_at, updated_at";

// =============================================================================
// Unit-of-work Operations
// =============================================================================

/// Looks up a product by id.
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, brand, category, master_category, sku, buy_price,
               sell_price, stock, image_url, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Takes `quantity` units off the shelf if at least that many are there.
///
/// ## Returns
/// * `Ok(true)` - Stock decremented
/// * `Ok(false)` - Product missing or stock below `quantity`; nothing written
pub async fn decrement_stock<'e, E>(executor: E, id: &str, quantity: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity, "Decrementing stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Puts `quantity` units back on the shelf.
///
/// ## Returns
/// * `Ok(true)` - Stock incremented
/// * `Ok(false)` - Product no longer exists
pub async fn increment_stock<'e, E>(executor: E, id: &str, quantity: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, quantity, "Incrementing stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Inserts a validated product and returns the stored row.
pub async fn insert<'e, E>(executor: E, product: &NewProduct) -> DbResult<Product>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %product.id, sku = %product.sku, "Inserting product");

    let now = Utc::now();

    let inserted = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            id, name, brand, category, master_category, sku,
            buy_price, sell_price, stock, image_url, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
        RETURNING id, name, brand, category, master_category, sku, buy_price,
                  sell_price, stock, image_url, created_at, updated_at
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.brand)
    .bind(&product.category)
    .bind(&product.master_category)
    .bind(&product.sku)
    .bind(product.buy_price)
    .bind(product.sell_price)
    .bind(product.stock)
    .bind(&product.image_url)
    .bind(now)
    .fetch_one(executor)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } if field.ends_with(".sku") => {
            DbError::duplicate("sku", &product.sku)
        }
        other => other,
    })?;

    Ok(inserted)
}

/// Appends the filter's WHERE clause to a query.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a ProductFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(brand) = filter.brand {
        qb.push(" AND brand = ").push_bind(brand);
    }

    if !filter.search.is_empty() {
        // LIKE is case-insensitive for ASCII in SQLite
        let pattern = format!("%{}%", escape_like(&filter.search));
        qb.push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR sku LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category);
    }

    if let Some(master) = &filter.master_category {
        qb.push(" AND master_category = ").push_bind(master);
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let page = repo.list(&filter).await?;
/// let product = repo.get_by_id("PRD-1a2b3c4d").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists one page of products matching the filter, ordered by name.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        debug!(
            brand = ?filter.brand,
            search = %filter.search,
            limit = filter.limit,
            offset = filter.offset,
            "Listing products"
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(PRODUCT_COLUMNS).push(" FROM products");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts all products matching the filter, ignoring paging.
    pub async fn count_matching(&self, filter: &ProductFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Distinct non-empty categories of a brand, sorted.
    pub async fn categories(&self, brand: Brand) -> DbResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category FROM products
            WHERE brand = ?1 AND category <> ''
            ORDER BY category ASC
            "#,
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Distinct non-empty master categories of a brand, sorted.
    pub async fn master_categories(&self, brand: Brand) -> DbResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT master_category FROM products
            WHERE brand = ?1 AND master_category <> ''
            ORDER BY master_category ASC
            "#,
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        find_by_id(&self.pool, id).await
    }

    /// Gets a product by its manual SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, category, master_category, sku, buy_price,
                   sell_price, stock, image_url, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        insert(&self.pool, product).await
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - The updated row
    /// * `Ok(None)` - No product with that id
    pub async fn update(&self, id: &str, changes: &ProductChanges) -> DbResult<Option<Product>> {
        debug!(id = %id, "Updating product");

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(brand) = changes.brand {
            qb.push(", brand = ").push_bind(brand);
        }
        if let Some(category) = &changes.category {
            qb.push(", category = ").push_bind(category);
        }
        if let Some(master) = &changes.master_category {
            qb.push(", master_category = ").push_bind(master);
        }
        if let Some(sku) = &changes.sku {
            qb.push(", sku = ").push_bind(sku);
        }
        if let Some(buy_price) = changes.buy_price {
            qb.push(", buy_price = ").push_bind(buy_price);
        }
        if let Some(sell_price) = changes.sell_price {
            qb.push(", sell_price = ").push_bind(sell_price);
        }
        if let Some(stock) = changes.stock {
            qb.push(", stock = ").push_bind(stock);
        }
        if let Some(image_url) = &changes.image_url {
            qb.push(", image_url = ").push_bind(image_url.clone());
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(PRODUCT_COLUMNS);

        let product = qb
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } if field.ends_with(".sku") => {
                    DbError::duplicate("sku", changes.sku.clone().unwrap_or_default())
                }
                other => other,
            })?;

        Ok(product)
    }

    /// Hard-deletes a product and returns the deleted row.
    ///
    /// Sales keep their line items; those carry the name and price snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Deleting product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = ?1
            RETURNING id, name, brand, category, master_category, sku, buy_price,
                      sell_price, stock, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Products below the low-stock threshold, emptiest first.
    pub async fn low_stock(&self, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, category, master_category, sku, buy_price,
                   sell_price, stock, image_url, created_at, updated_at
            FROM products
            WHERE stock < ?1
            ORDER BY stock ASC, name ASC
            LIMIT ?2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use moto_core::catalog::CreateProductRequest;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(id: &str, name: &str, brand: Brand, category: &str, stock: i64) -> NewProduct {
        NewProduct {
            id: id.to_string(),
            name: name.to_string(),
            brand,
            category: category.to_string(),
            master_category: "Mesin".to_string(),
            sku: format!("SKU-{}", id),
            buy_price: 10_000,
            sell_price: 15_000,
            stock,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let inserted = repo
            .insert(&new_product("P1", "Busi NGK", Brand::Honda, "Busi", 5))
            .await
            .unwrap();
        assert_eq!(inserted.stock, 5);
        assert_eq!(inserted.brand, Brand::Honda);

        let fetched = repo.get_by_id("P1").await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(repo.get_by_sku("SKU-P1").await.unwrap().unwrap().id, "P1");
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_reported() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&new_product("P1", "Busi", Brand::Honda, "Busi", 1))
            .await
            .unwrap();
        let mut dup = new_product("P2", "Busi Lagi", Brand::Honda, "Busi", 1);
        dup.sku = "SKU-P1".to_string();

        let err = repo.insert(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "sku"));
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let db = test_db().await;
        db.products()
            .insert(&new_product("P1", "Busi", Brand::Honda, "Busi", 3))
            .await
            .unwrap();

        assert!(decrement_stock(db.pool(), "P1", 2).await.unwrap());
        assert!(!decrement_stock(db.pool(), "P1", 2).await.unwrap());
        assert!(!decrement_stock(db.pool(), "missing", 1).await.unwrap());

        let product = find_by_id(db.pool(), "P1").await.unwrap().unwrap();
        assert_eq!(product.stock, 1);

        assert!(increment_stock(db.pool(), "P1", 4).await.unwrap());
        assert!(!increment_stock(db.pool(), "missing", 4).await.unwrap());
        assert_eq!(find_by_id(db.pool(), "P1").await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_list_filters_and_categories() {
        let db = test_db().await;
        let repo = db.products();

        for p in [
            new_product("P1", "Kampas Rem Depan", Brand::Honda, "Rem", 10),
            new_product("P2", "Kampas Rem Belakang", Brand::Honda, "Rem", 10),
            new_product("P3", "Busi Iridium", Brand::Honda, "Busi", 2),
            new_product("P4", "Kampas Rem 100%", Brand::Yamaha, "Rem", 0),
        ] {
            repo.insert(&p).await.unwrap();
        }

        let filter = ProductFilter {
            brand: Some(Brand::Honda),
            search: "kampas".to_string(),
            ..Default::default()
        };
        let names: Vec<String> = repo
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Kampas Rem Belakang", "Kampas Rem Depan"]);
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 2);

        // search also hits the SKU
        let by_sku = ProductFilter {
            search: "sku-p3".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_sku).await.unwrap()[0].id, "P3");

        // LIKE wildcards in the query are literal
        let literal = ProductFilter {
            search: "100%".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.count_matching(&literal).await.unwrap(), 1);

        let paged = ProductFilter {
            limit: 1,
            offset: 1,
            ..Default::default()
        };
        assert_eq!(repo.list(&paged).await.unwrap().len(), 1);

        assert_eq!(
            repo.categories(Brand::Honda).await.unwrap(),
            vec!["Busi", "Rem"]
        );
        assert_eq!(
            repo.master_categories(Brand::Yamaha).await.unwrap(),
            vec!["Mesin"]
        );
        assert!(repo.categories(Brand::Suzuki).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&new_product("P1", "Busi", Brand::Honda, "Busi", 3))
            .await
            .unwrap();

        let changes = ProductChanges {
            sell_price: Some(20_000),
            brand: Some(Brand::Suzuki),
            image_url: Some(Some("https://cdn.example/busi.png".to_string())),
            ..Default::default()
        };
        let updated = repo.update("P1", &changes).await.unwrap().unwrap();

        assert_eq!(updated.sell_price, 20_000);
        assert_eq!(updated.brand, Brand::Suzuki);
        assert_eq!(updated.name, "Busi");
        assert_eq!(updated.stock, 3);
        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://cdn.example/busi.png")
        );

        assert!(repo.update("missing", &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_and_low_stock() {
        let db = test_db().await;
        let repo = db.products();
        let created = CreateProductRequest {
            name: Some("Oli Mesin".to_string()),
            brand: Some("kawasaki".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        repo.insert(&created).await.unwrap();
        repo.insert(&new_product("P2", "Busi", Brand::Honda, "Busi", 3))
            .await
            .unwrap();
        repo.insert(&new_product("P3", "Rantai", Brand::Honda, "Rantai", 50))
            .await
            .unwrap();

        let low: Vec<String> = repo
            .low_stock(5)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(low, vec!["Oli Mesin", "Busi"]);

        let deleted = repo.delete(&created.id).await.unwrap().unwrap();
        assert_eq!(deleted.name, "Oli Mesin");
        assert!(repo.delete(&created.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
