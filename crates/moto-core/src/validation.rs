//! # Validation Module
//!
//! Field-level validation and request coercion for Moto POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── JSON shape (deserialization, Numeric coercion)                    │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (stock >= 0) constraints                         │
//! │  ├── UNIQUE (sku) constraint                                           │
//! │  └── Foreign key (line item → sale) constraint                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use moto_core::validation::{validate_quantity, validate_sku};
//!
//! assert!(validate_sku("HON-06455-KVB").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use serde::Deserialize;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_SKU_LEN: usize = 64;
pub const MAX_LABEL_LEN: usize = 100;
pub const MAX_SEARCH_LEN: usize = 100;
pub const MAX_URL_LEN: usize = 2048;
pub const MAX_ID_LEN: usize = 64;

// =============================================================================
// Numeric Coercion
// =============================================================================

/// A numeric request field as the frontend actually sends it.
///
/// Form inputs arrive as strings, computed totals as floats, and the rest as
/// integers. All three are accepted as long as they denote a whole number.
///
/// ```text
/// 5        → 5
/// 5.0      → 5
/// "5"      → 5
/// 5.5      → InvalidFormat
/// "lima"   → InvalidFormat
/// true, [] → InvalidFormat
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
    /// Any other JSON value. Kept so the body still parses and the error
    /// can name the field.
    Other(serde_json::Value),
}

impl Numeric {
    /// Coerces to a whole number, naming `field` on failure.
    pub fn to_i64(&self, field: &str) -> ValidationResult<i64> {
        match self {
            Numeric::Int(v) => Ok(*v),
            Numeric::Float(v) => {
                if v.is_finite()
                    && v.fract() == 0.0
                    && (i64::MIN as f64..i64::MAX as f64).contains(v)
                {
                    Ok(*v as i64)
                } else {
                    Err(ValidationError::invalid(field, "must be a whole number"))
                }
            }
            Numeric::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::invalid(field, "must be a whole number")),
            Numeric::Other(_) => Err(ValidationError::invalid(field, "must be a whole number")),
        }
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Int(v)
    }
}

/// Coerces an optional numeric field, defaulting to `default` when absent.
pub fn coerce_or(value: Option<&Numeric>, field: &str, default: i64) -> ValidationResult<i64> {
    match value {
        Some(n) => n.to_i64(field),
        None => Ok(default),
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    validate_name("name", name)
}

/// Validates the shop name printed on receipts. Same rules as product names.
pub fn validate_store_name(name: &str) -> ValidationResult<String> {
    validate_name("storeName", name)
}

fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a manual SKU.
///
/// Manufacturer part numbers come in every shape (`06455-KVB-901`,
/// `5TL-F5805-00`, `NGK/CPR7EA`), so the only rules are non-empty, bounded
/// length and no whitespace.
///
/// ## Example
/// ```rust
/// use moto_core::validation::validate_sku;
///
/// assert!(validate_sku("NGK/CPR7EA").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<String> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if sku.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid("sku", "must not contain whitespace"));
    }

    Ok(sku.to_string())
}

/// Validates a category or master-category label. Empty is allowed.
pub fn validate_label(field: &str, label: &str) -> ValidationResult<String> {
    let label = label.trim();

    if label.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_LABEL_LEN,
        });
    }

    Ok(label.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates an optional image URL. Blank becomes `None`.
pub fn validate_image_url(url: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    if url.len() > MAX_URL_LEN {
        return Err(ValidationError::TooLong {
            field: "imageProduct".to_string(),
            max: MAX_URL_LEN,
        });
    }

    Ok(Some(url.to_string()))
}

/// Validates an entity id taken from a path or body.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::required(field));
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(id.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ```text
/// qty <= 0 → "quantity must be positive"
/// otherwise OK
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in rupiah. Zero is allowed (unknown buy price,
/// giveaway items).
///
/// ## Example
/// ```rust
/// use moto_core::validation::validate_price;
///
/// assert!(validate_price("sellPrice", 18_500).is_ok());
/// assert!(validate_price("sellPrice", 0).is_ok());
/// assert!(validate_price("sellPrice", -1).is_err());
/// ```
pub fn validate_price(field: &str, rupiah: i64) -> ValidationResult<()> {
    if rupiah < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level set through inventory edits.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
