//! # Checkout
//!
//! Turns a raw checkout body into a validated cart with its totals computed.
//!
//! ## Flow
//! ```text
//! POST /api/transactions
//! {"items":[{"id":"PRD-…","quantity":"2","price":10000}],"paymentAmount":30000}
//!      │
//!      ▼
//! CheckoutRequest (serde, loose types)
//!      │ validate()
//!      ▼
//! ValidatedCart {lines, total, payment, change}
//!      │
//!      ▼
//! moto-db CheckoutEngine (one SQLite transaction)
//! ```
//!
//! Everything in this module runs before the database is touched, so an
//! invalid cart never opens a unit of work.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{coerce_or, validate_id, validate_price, validate_quantity, Numeric, ValidationResult};

// =============================================================================
// Raw Request
// =============================================================================

/// Checkout body as sent by the cashier screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Option<Vec<CartLineInput>>,

    /// Missing means zero.
    #[serde(default)]
    pub payment_amount: Option<Numeric>,

    /// Accepted and ignored; change is always recomputed from the payment.
    #[serde(default)]
    pub change_amount: Option<Numeric>,
}

/// One cart line as sent by the cashier screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartLineInput {
    /// Product id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub quantity: Option<Numeric>,
    /// Unit price the cashier charged.
    #[serde(default)]
    pub price: Option<Numeric>,
}

impl CartLineInput {
    pub fn new(id: impl Into<String>, quantity: i64, price: i64) -> Self {
        CartLineInput {
            id: Some(id.into()),
            quantity: Some(Numeric::Int(quantity)),
            price: Some(Numeric::Int(price)),
        }
    }
}

// =============================================================================
// Validated Cart
// =============================================================================

/// A cart line that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A non-empty cart with totals computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCart {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub payment: Money,
    pub change: Money,
}

impl CheckoutRequest {
    /// Convenience constructor used by tests and tooling.
    pub fn new(items: Vec<CartLineInput>, payment_amount: i64) -> Self {
        CheckoutRequest {
            items: Some(items),
            payment_amount: Some(Numeric::Int(payment_amount)),
            change_amount: None,
        }
    }

    /// Validates the request and computes total, payment and change.
    ///
    /// ## Rules
    /// - At least one line, otherwise `EmptyCart`
    /// - Every line needs an id, a positive whole quantity and a
    ///   non-negative whole price
    /// - `paymentAmount` is non-negative, zero when missing
    /// - `total = Σ price × quantity`, overflow is a validation error
    /// - `change = max(0, payment − total)`
    pub fn validate(&self) -> ValidationResult<ValidatedCart> {
        let items = match self.items.as_deref() {
            Some(items) if !items.is_empty() => items,
            _ => return Err(ValidationError::EmptyCart),
        };

        let mut lines = Vec::with_capacity(items.len());
        let mut total = Money::zero();

        for (i, item) in items.iter().enumerate() {
            let line = validate_line(i, item)?;
            total = total.checked_add(line.line_total).ok_or_else(|| {
                ValidationError::Overflow {
                    field: "totalAmount".to_string(),
                }
            })?;
            lines.push(line);
        }

        let payment = coerce_or(self.payment_amount.as_ref(), "paymentAmount", 0)?;
        validate_price("paymentAmount", payment)?;
        let payment = Money::from_rupiah(payment);

        Ok(ValidatedCart {
            lines,
            total,
            payment,
            change: payment.change_for(total),
        })
    }
}

fn validate_line(index: usize, item: &CartLineInput) -> ValidationResult<CartLine> {
    let field = |name: &str| format!("items[{}].{}", index, name);

    let product_id = validate_id(&field("id"), item.id.as_deref().unwrap_or_default())?;

    let quantity = item
        .quantity
        .as_ref()
        .ok_or_else(|| ValidationError::required(&field("quantity")))?
        .to_i64(&field("quantity"))?;
    validate_quantity(quantity).map_err(|_| ValidationError::MustBePositive {
        field: field("quantity"),
    })?;

    let price = item
        .price
        .as_ref()
        .ok_or_else(|| ValidationError::required(&field("price")))?
        .to_i64(&field("price"))?;
    validate_price(&field("price"), price)?;

    let unit_price = Money::from_rupiah(price);
    let line_total = unit_price
        .multiply_quantity(quantity)
        .ok_or_else(|| ValidationError::Overflow { field: field("price") })?;

    Ok(CartLine {
        product_id,
        quantity,
        unit_price,
        line_total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
