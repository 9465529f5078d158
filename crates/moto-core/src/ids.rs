//! # Entity Ids
//!
//! Human-readable ids for the entities a cashier reads aloud or prints.
//!
//! ```text
//! Sale       TRS-1a2b3c4d    printed on receipts, typed into the returns screen
//! Product    PRD-9f8e7d6c    shown in the catalog, prefixed into default SKUs
//! Line item  <uuid v4>       never shown
//! ```
//!
//! Eight hex characters give about four billion sale ids. Collisions are
//! unlikely but possible, so checkout re-rolls against the database up to
//! [`crate::MAX_SALE_ID_ATTEMPTS`] times.

use uuid::Uuid;

use crate::types::Brand;

pub const SALE_ID_PREFIX: &str = "TRS-";
pub const PRODUCT_ID_PREFIX: &str = "PRD-";

/// Length of the random part of sale and product ids.
pub const SHORT_TOKEN_LEN: usize = 8;

fn short_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(SHORT_TOKEN_LEN);
    token
}

/// Generates a candidate sale id. Uniqueness is checked by the caller.
pub fn generate_sale_id() -> String {
    format!("{}{}", SALE_ID_PREFIX, short_token())
}

/// Generates a product id.
pub fn generate_product_id() -> String {
    format!("{}{}", PRODUCT_ID_PREFIX, short_token())
}

/// Generates an id for rows nobody reads (line items, shop record).
pub fn generate_row_id() -> String {
    Uuid::new_v4().to_string()
}

/// SKU assigned when a product is created without one: `HON-PRD-1a2b3c4d`.
pub fn default_sku(brand: Brand, product_id: &str) -> String {
    format!("{}-{}", brand.sku_prefix(), product_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
