//! # Domain Types
//!
//! Core domain types used throughout Moto POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  SaleLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (PRD-…)     │   │  id (TRS-…)     │   │  id (UUID)      │       │
//! │  │  sku (manual)   │   │  status         │   │  sale_id (FK)   │       │
//! │  │  brand          │   │  total_amount   │   │  product_id     │       │
//! │  │  stock          │   │  payment/change │   │  name, price    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Brand       │   │   SaleStatus    │   │    ShopData     │       │
//! │  │  HONDA YAMAHA   │   │  SUCCESS        │   │  id, name       │       │
//! │  │  KAWASAKI SUZUKI│   │  RETURNED       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every type serializes with camelCase keys, matching what the web
//! frontend already consumes (`skuManual`, `imageProduct`, `totalAmount`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Brand
// =============================================================================

/// Motorcycle manufacturer a part belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Brand {
    Honda,
    Yamaha,
    Kawasaki,
    Suzuki,
}

impl Brand {
    pub const ALL: [Brand; 4] = [Brand::Honda, Brand::Yamaha, Brand::Kawasaki, Brand::Suzuki];

    /// Upper-case name as stored and sent over the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Brand::Honda => "HONDA",
            Brand::Yamaha => "YAMAHA",
            Brand::Kawasaki => "KAWASAKI",
            Brand::Suzuki => "SUZUKI",
        }
    }

    /// Three-letter prefix used for generated SKUs (`HON-PRD-1a2b3c4d`).
    pub fn sku_prefix(&self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"honda"`, `"Honda"` and `"HONDA"` all parse.
impl FromStr for Brand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Brand::ALL
            .into_iter()
            .find(|b| b.as_str() == upper)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "brand".to_string(),
                allowed: Brand::ALL.iter().map(|b| b.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A motorcycle part on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// `PRD-` + 8 hex characters.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub brand: Brand,

    /// Fine-grained category label (e.g. "Kampas Rem").
    pub category: String,

    /// Coarse grouping above `category` (e.g. "Pengereman").
    pub master_category: String,

    /// Shop-assigned SKU, unique across the catalog.
    #[serde(rename = "skuManual")]
    pub sku: String,

    /// Purchase price in rupiah. Zero means "unknown".
    pub buy_price: i64,

    /// Shelf price in rupiah.
    pub sell_price: i64,

    /// Quantity on hand. Never negative.
    pub stock: i64,

    #[serde(rename = "imageProduct")]
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can leave the shelf.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle of a sale.
///
/// ```text
/// SUCCESS ──return──► RETURNED (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    /// Paid and stock taken off the shelf.
    Success,
    /// Reversed; stock restored.
    Returned,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Success
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header. Called "transaction" on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// `TRS-` + 8 hex characters.
    pub id: String,
    /// Σ unit price × quantity at the time of sale. Immutable.
    pub total_amount: i64,
    pub payment_amount: i64,
    pub change_amount: i64,
    pub status: SaleStatus,
    pub is_complete: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line in a sale.
/// Uses snapshot pattern to freeze product data at time of sale, so the
/// line survives later price edits and product deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    /// Reference only; the product may since have been deleted.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price in rupiah at time of sale (frozen).
    pub unit_price: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleLineItem>,
}

// =============================================================================
// Shop Data
// =============================================================================

/// Store metadata printed on receipts. There is exactly one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShopData {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Number of products in the catalog.
    pub total_stock: i64,
    /// Σ total of SUCCESS sales.
    pub total_amount: i64,
    /// Σ quantity across SUCCESS sales.
    pub total_quantity: i64,
    /// Products with stock below the low-stock threshold.
    pub low_stock_count: i64,
}

/// A product ranked by units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BestSeller {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: Product,
    pub total_sold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_parse_is_case_insensitive() {
        assert_eq!("honda".parse::<Brand>().unwrap(), Brand::Honda);
        assert_eq!(" Yamaha ".parse::<Brand>().unwrap(), Brand::Yamaha);
        assert_eq!("SUZUKI".parse::<Brand>().unwrap(), Brand::Suzuki);
    }

    #[test]
    fn test_brand_parse_rejects_unknown() {
        let err = "ducati".parse::<Brand>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_brand_sku_prefix() {
        assert_eq!(Brand::Kawasaki.sku_prefix(), "KAW");
        assert_eq!(Brand::Honda.sku_prefix(), "HON");
    }

    #[test]
    fn test_sale_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SaleStatus::Returned).unwrap(),
            "\"RETURNED\""
        );
        assert_eq!(SaleStatus::default(), SaleStatus::Success);
    }

    #[test]
    fn test_product_wire_names() {
        let now = Utc::now();
        let product = Product {
            id: "PRD-1a2b3c4d".to_string(),
            name: "Busi NGK CPR7EA".to_string(),
            brand: Brand::Honda,
            category: "Busi".to_string(),
            master_category: "Kelistrikan".to_string(),
            sku: "HON-PRD-1a2b3c4d".to_string(),
            buy_price: 15_000,
            sell_price: 18_500,
            stock: 3,
            image_url: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["skuManual"], "HON-PRD-1a2b3c4d");
        assert_eq!(json["masterCategory"], "Kelistrikan");
        assert_eq!(json["brand"], "HONDA");
        assert!(json["imageProduct"].is_null());
        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
    }
}
