//! # Report Repository
//!
//! Read-only aggregates for the dashboard and the profit chart.
//!
//! ## Profit Query
//! ```text
//! sale_line_items ──┬── sales      (status = success, date(created_at) in range)
//!                   └── products   (LEFT JOIN: deleted products still count)
//!
//! GROUP BY date(created_at)
//!   gross = Σ unit_price × qty
//!   net   = Σ (unit_price − buy_price) × qty    when buy_price > 0
//!           Σ fallback_margin × qty             otherwise (or product gone)
//! ```
//! Days without sales are filled in by `moto_core::report::fill_days`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use moto_core::report::{fill_days, DailyProfit, DateRange};
use moto_core::{BestSeller, DashboardSummary, SaleStatus, LOW_STOCK_THRESHOLD};

/// One aggregated day as it comes out of SQLite.
#[derive(Debug, sqlx::FromRow)]
struct ProfitRow {
    day: String,
    gross_income: i64,
    net_income: i64,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Per-day gross and net income of SUCCESS sales, one entry per day in
    /// the range.
    pub async fn daily_profit(
        &self,
        range: &DateRange,
        fallback_margin: i64,
    ) -> DbResult<Vec<DailyProfit>> {
        debug!(start = %range.start, end = %range.end, fallback_margin, "Computing daily profit");

        let rows = sqlx::query_as::<_, ProfitRow>(
            r#"
            SELECT
                date(s.created_at) AS day,
                SUM(li.unit_price * li.quantity) AS gross_income,
                SUM(
                    CASE WHEN p.buy_price > 0
                        THEN (li.unit_price - p.buy_price) * li.quantity
                        ELSE ?4 * li.quantity
                    END
                ) AS net_income
            FROM sale_line_items li
            JOIN sales s ON s.id = li.sale_id
            LEFT JOIN products p ON p.id = li.product_id
            WHERE s.status = ?3
              AND date(s.created_at) BETWEEN ?1 AND ?2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(range.start.format("%Y-%m-%d").to_string())
        .bind(range.end.format("%Y-%m-%d").to_string())
        .bind(SaleStatus::Success)
        .bind(fallback_margin)
        .fetch_all(&self.pool)
        .await?;

        let days = rows.into_iter().filter_map(|row| {
            chrono::NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")
                .ok()
                .map(|date| DailyProfit {
                    date,
                    net_income: row.net_income,
                    gross_income: row.gross_income,
                })
        });

        Ok(fill_days(range, days))
    }

    /// Headline numbers for the dashboard.
    pub async fn dashboard_summary(&self) -> DbResult<DashboardSummary> {
        let total_stock: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let total_amount: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM sales WHERE status = ?1",
        )
        .bind(SaleStatus::Success)
        .fetch_one(&self.pool)
        .await?;

        let total_quantity: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(li.quantity), 0)
            FROM sale_line_items li
            JOIN sales s ON s.id = li.sale_id
            WHERE s.status = ?1
            "#,
        )
        .bind(SaleStatus::Success)
        .fetch_one(&self.pool)
        .await?;

        let low_stock_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock < ?1")
                .bind(LOW_STOCK_THRESHOLD)
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardSummary {
            total_stock,
            total_amount,
            total_quantity,
            low_stock_count,
        })
    }

    /// Products ranked by units sold in SUCCESS sales.
    ///
    /// Deleted products drop out of the ranking.
    pub async fn best_sellers(&self, limit: i64) -> DbResult<Vec<BestSeller>> {
        let rows = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT
                p.id, p.name, p.brand, p.category, p.master_category, p.sku,
                p.buy_price, p.sell_price, p.stock, p.image_url,
                p.created_at, p.updated_at,
                SUM(li.quantity) AS total_sold
            FROM sale_line_items li
            JOIN sales s ON s.id = li.sale_id
            JOIN products p ON p.id = li.product_id
            WHERE s.status = ?1
            GROUP BY p.id
            ORDER BY total_sold DESC, p.name ASC
            LIMIT ?2
            "#,
        )
        .bind(SaleStatus::Success)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
