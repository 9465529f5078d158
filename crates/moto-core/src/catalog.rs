//! # Catalog Requests
//!
//! Validation for product create/update bodies and catalog list filters.
//!
//! ```text
//! CreateProductRequest ──validate()──► NewProduct      (id + default SKU assigned)
//! UpdateProductRequest ──validate()──► ProductChanges  (only the fields sent)
//! ProductListParams    ──validate()──► ProductFilter   (brand parsed, paging clamped)
//! ```

use serde::Deserialize;

use crate::error::ValidationError;
use crate::ids::{default_sku, generate_product_id};
use crate::types::Brand;
use crate::validation::{
    coerce_or, validate_image_url, validate_label, validate_price, validate_product_name,
    validate_search_query, validate_sku, validate_stock, Numeric, ValidationResult,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub master_category: Option<String>,
    #[serde(default)]
    pub sku_manual: Option<String>,
    #[serde(default)]
    pub buy_price: Option<Numeric>,
    #[serde(default)]
    pub sell_price: Option<Numeric>,
    #[serde(default)]
    pub stock: Option<Numeric>,
    #[serde(default)]
    pub image_product: Option<String>,
}

/// A product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    pub brand: Brand,
    pub category: String,
    pub master_category: String,
    pub sku: String,
    pub buy_price: i64,
    pub sell_price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    /// Validates the body and assigns a fresh `PRD-` id.
    ///
    /// Prices and stock default to zero. A missing SKU becomes
    /// `{brand prefix}-{id}`.
    pub fn validate(&self) -> ValidationResult<NewProduct> {
        self.validate_with_id(generate_product_id())
    }

    pub fn validate_with_id(&self, id: String) -> ValidationResult<NewProduct> {
        let brand: Brand = self
            .brand
            .as_deref()
            .ok_or_else(|| ValidationError::required("brand"))?
            .parse()?;

        let name = validate_product_name(self.name.as_deref().unwrap_or_default())?;

        let sku = match self.sku_manual.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => validate_sku(s)?,
            _ => default_sku(brand, &id),
        };

        let buy_price = coerce_or(self.buy_price.as_ref(), "buyPrice", 0)?;
        validate_price("buyPrice", buy_price)?;
        let sell_price = coerce_or(self.sell_price.as_ref(), "sellPrice", 0)?;
        validate_price("sellPrice", sell_price)?;
        let stock = coerce_or(self.stock.as_ref(), "stock", 0)?;
        validate_stock(stock)?;

        Ok(NewProduct {
            id,
            name,
            brand,
            category: validate_label("category", self.category.as_deref().unwrap_or_default())?,
            master_category: validate_label(
                "masterCategory",
                self.master_category.as_deref().unwrap_or_default(),
            )?,
            sku,
            buy_price,
            sell_price,
            stock,
            image_url: validate_image_url(self.image_product.as_deref())?,
        })
    }
}

// =============================================================================
// Update
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub master_category: Option<String>,
    #[serde(default)]
    pub sku_manual: Option<String>,
    #[serde(default)]
    pub buy_price: Option<Numeric>,
    #[serde(default)]
    pub sell_price: Option<Numeric>,
    #[serde(default)]
    pub stock: Option<Numeric>,
    /// Blank string clears the image.
    #[serde(default)]
    pub image_product: Option<String>,
}

/// Partial product update. `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub brand: Option<Brand>,
    pub category: Option<String>,
    pub master_category: Option<String>,
    pub sku: Option<String>,
    pub buy_price: Option<i64>,
    pub sell_price: Option<i64>,
    pub stock: Option<i64>,
    pub image_url: Option<Option<String>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        *self == ProductChanges::default()
    }
}

impl UpdateProductRequest {
    pub fn validate(&self) -> ValidationResult<ProductChanges> {
        let price = |field: &str, v: Option<&Numeric>| -> ValidationResult<Option<i64>> {
            v.map(|n| {
                let rupiah = n.to_i64(field)?;
                validate_price(field, rupiah)?;
                Ok::<_, ValidationError>(rupiah)
            })
            .transpose()
        };

        let stock = self
            .stock
            .as_ref()
            .map(|n| {
                let stock = n.to_i64("stock")?;
                validate_stock(stock)?;
                Ok::<_, ValidationError>(stock)
            })
            .transpose()?;

        Ok(ProductChanges {
            name: self.name.as_deref().map(validate_product_name).transpose()?,
            brand: self.brand.as_deref().map(str::parse::<Brand>).transpose()?,
            category: self
                .category
                .as_deref()
                .map(|c| validate_label("category", c))
                .transpose()?,
            master_category: self
                .master_category
                .as_deref()
                .map(|c| validate_label("masterCategory", c))
                .transpose()?,
            sku: self.sku_manual.as_deref().map(validate_sku).transpose()?,
            buy_price: price("buyPrice", self.buy_price.as_ref())?,
            sell_price: price("sellPrice", self.sell_price.as_ref())?,
            stock,
            image_url: self
                .image_product
                .as_deref()
                .map(|u| validate_image_url(Some(u)))
                .transpose()?,
        })
    }
}

// =============================================================================
// List Filter
// =============================================================================

/// Query string of `GET /api/products`, all fields as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub brand: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub master_category: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub skip_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub brand: Option<Brand>,
    /// Case-insensitive substring of name or SKU. Empty means no filter.
    pub search: String,
    pub category: Option<String>,
    pub master_category: Option<String>,
    pub limit: i64,
    pub offset: i64,
    /// When set, `totalCount` is estimated instead of counted.
    pub skip_count: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            brand: None,
            search: String::new(),
            category: None,
            master_category: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            skip_count: false,
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl ProductListParams {
    pub fn validate(&self) -> ValidationResult<ProductFilter> {
        let int = |field: &str, v: Option<&str>, default: i64| -> ValidationResult<i64> {
            match non_blank(v) {
                Some(s) => s
                    .parse::<i64>()
                    .map_err(|_| ValidationError::invalid(field, "must be a whole number")),
                None => Ok(default),
            }
        };

        let offset = int("offset", self.offset.as_deref(), 0)?;
        if offset < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "offset".to_string(),
            });
        }

        Ok(ProductFilter {
            brand: non_blank(self.brand.as_deref()).map(str::parse::<Brand>).transpose()?,
            search: validate_search_query(self.search.as_deref().unwrap_or_default())?,
            category: non_blank(self.category.as_deref()).map(str::to_string),
            master_category: non_blank(self.master_category.as_deref()).map(str::to_string),
            limit: int("limit", self.limit.as_deref(), DEFAULT_PAGE_SIZE)?.clamp(1, MAX_PAGE_SIZE),
            offset,
            skip_count: self.skip_count.as_deref() == Some("true"),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
