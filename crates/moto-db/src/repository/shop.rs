//! # Shop Repository
//!
//! The store's name and id, printed on receipts. The table holds one row,
//! created with a default name the first time anyone asks for it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use moto_core::ids::generate_row_id;
use moto_core::ShopData;

/// Name given to the shop row on first access.
pub const DEFAULT_SHOP_NAME: &str = "My Store";

#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Returns the shop row, inserting the default one if the table is empty.
    ///
    /// The insert is guarded by `NOT EXISTS`, so two first requests racing
    /// each other still leave a single row.
    pub async fn get_or_create(&self) -> DbResult<ShopData> {
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO shop_data (id, name, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?3
            WHERE NOT EXISTS (SELECT 1 FROM shop_data)
            "#,
        )
        .bind(generate_row_id())
        .bind(DEFAULT_SHOP_NAME)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            info!(name = DEFAULT_SHOP_NAME, "Created default shop record");
        }

        sqlx::query_as::<_, ShopData>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM shop_data
            ORDER BY created_at ASC, rowid ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("ShopData", "default"))
    }

    /// Renames the shop.
    ///
    /// ## Returns
    /// * `Ok(None)` - No shop row with that id
    pub async fn rename(&self, id: &str, name: &str) -> DbResult<Option<ShopData>> {
        debug!(id = %id, name = %name, "Renaming shop");

        let shop = sqlx::query_as::<_, ShopData>(
            r#"
            UPDATE shop_data
            SET name = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }
}
