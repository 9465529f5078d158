//! # Profit Report
//!
//! Shapes per-day profit totals for the dashboard chart.
//!
//! ## Profit Rule
//! ```text
//! per line:
//!   buy_price > 0  →  (unit_price − buy_price) × qty
//!   buy_price = 0  →  fallback_margin × qty        (buy price unknown)
//!
//! per day:
//!   grossIncome = Σ unit_price × qty
//!   netIncome   = Σ line profit
//! ```
//!
//! Aggregation happens in SQL (moto-db); this module owns the date range,
//! the zero-fill of empty days, and the rule above for callers that compute
//! profit in memory.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Longest range the report will zero-fill (ten years).
pub const MAX_REPORT_DAYS: i64 = 3_660;

// =============================================================================
// Daily Profit
// =============================================================================

/// One point on the profit chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyProfit {
    /// `YYYY-MM-DD` (UTC).
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub net_income: i64,
    pub gross_income: i64,
}

impl DailyProfit {
    pub fn zero(date: NaiveDate) -> Self {
        DailyProfit {
            date,
            net_income: 0,
            gross_income: 0,
        }
    }
}

/// Profit on one sold line.
///
/// ## Example
/// ```rust
/// use moto_core::report::line_profit;
///
/// assert_eq!(line_profit(18_500, 15_000, 2, 3_000), 7_000);
/// assert_eq!(line_profit(18_500, 0, 2, 3_000), 6_000);
/// ```
pub fn line_profit(unit_price: i64, buy_price: i64, quantity: i64, fallback_margin: i64) -> i64 {
    if buy_price > 0 {
        unit_price
            .saturating_sub(buy_price)
            .saturating_mul(quantity)
    } else {
        fallback_margin.saturating_mul(quantity)
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive day range of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Accepts `2024-06-01` or a full RFC 3339 timestamp (date part in UTC).
fn parse_day(field: &str, raw: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::required(field))?;

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc().date())
        .map_err(|_| ValidationError::invalid(field, "expected YYYY-MM-DD"))
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::invalid("start", "must not be after end"));
        }
        if (end - start).num_days() >= MAX_REPORT_DAYS {
            return Err(ValidationError::invalid(
                "end",
                format!("range must not exceed {} days", MAX_REPORT_DAYS),
            ));
        }
        Ok(DateRange { start, end })
    }

    /// Parses the `start`/`end` query parameters.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ValidationResult<Self> {
        DateRange::new(parse_day("start", start)?, parse_day("end", end)?)
    }

    /// Every day in the range, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Lays the aggregated days over the full range, filling gaps with zero.
///
/// Rows outside the range are dropped; rows for the same day are summed.
pub fn fill_days(range: &DateRange, rows: impl IntoIterator<Item = DailyProfit>) -> Vec<DailyProfit> {
    let mut by_day: HashMap<NaiveDate, DailyProfit> = HashMap::new();
    for row in rows {
        let entry = by_day
            .entry(row.date)
            .or_insert_with(|| DailyProfit::zero(row.date));
        entry.net_income = entry.net_income.saturating_add(row.net_income);
        entry.gross_income = entry.gross_income.saturating_add(row.gross_income);
    }

    range
        .days()
        .map(|day| by_day.remove(&day).unwrap_or_else(|| DailyProfit::zero(day)))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_line_profit_uses_fallback_without_buy_price() {
        assert_eq!(line_profit(10_000, 7_000, 3, 3_000), 9_000);
        assert_eq!(line_profit(10_000, 0, 3, 3_000), 9_000);
        assert_eq!(line_profit(10_000, 0, 1, 2_500), 2_500);
        // selling below cost is a loss, not clamped
        assert_eq!(line_profit(5_000, 7_000, 1, 3_000), -2_000);
    }

    #[test]
    fn test_parse_range() {
        let range = DateRange::parse(Some("2024-06-01"), Some("2024-06-03")).unwrap();
        assert_eq!(range.days().count(), 3);
        assert_eq!(range.days().last(), Some(day("2024-06-03")));

        let range = DateRange::parse(Some("2024-06-01T08:00:00Z"), Some("2024-06-01")).unwrap();
        assert_eq!(range.start, day("2024-06-01"));
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_parse_range_errors() {
        assert_eq!(
            DateRange::parse(None, Some("2024-06-01")),
            Err(ValidationError::required("start"))
        );
        assert!(DateRange::parse(Some("01/06/2024"), Some("2024-06-01")).is_err());
        assert!(DateRange::parse(Some("2024-06-05"), Some("2024-06-01")).is_err());
        assert!(DateRange::parse(Some("1900-01-01"), Some("2024-06-01")).is_err());
    }

    #[test]
    fn test_fill_days_zero_fills_and_merges() {
        let range = DateRange::new(day("2024-06-01"), day("2024-06-04")).unwrap();
        let rows = vec![
            DailyProfit {
                date: day("2024-06-02"),
                net_income: 6_000,
                gross_income: 25_000,
            },
            DailyProfit {
                date: day("2024-06-02"),
                net_income: 1_000,
                gross_income: 5_000,
            },
            DailyProfit {
                date: day("2024-07-01"),
                net_income: 99,
                gross_income: 99,
            },
        ];

        let filled = fill_days(&range, rows);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[0], DailyProfit::zero(day("2024-06-01")));
        assert_eq!(filled[1].net_income, 7_000);
        assert_eq!(filled[1].gross_income, 30_000);
        assert_eq!(filled[3], DailyProfit::zero(day("2024-06-04")));
    }

    #[test]
    fn test_daily_profit_wire_format() {
        let json = serde_json::to_value(DailyProfit::zero(day("2024-06-01"))).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["netIncome"], 0);
        assert_eq!(json["grossIncome"], 0);
    }
}
