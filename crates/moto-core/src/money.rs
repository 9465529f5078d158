//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The shop prices in Indonesian rupiah, which has no minor unit in      │
//! │  practice. Every amount is a whole number of rupiah held in an i64.    │
//! │                                                                         │
//! │    Kampas Rem   Rp45.000 × 2  =  Rp90.000                              │
//! │    Busi NGK     Rp18.500 × 4  =  Rp74.000                              │
//! │                                ──────────                               │
//! │    Total                         Rp164.000                              │
//! │                                                                         │
//! │  No floating point anywhere between the request body and the database. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use moto_core::money::Money;
//!
//! let price = Money::from_rupiah(45_000);
//! let line = price.multiply_quantity(2).unwrap();
//! let total = line + Money::from_rupiah(74_000);
//! assert_eq!(total.rupiah(), 164_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (profit, change) may go negative before
///   clamping
/// - **Newtype**: serializes as a bare JSON integer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Returns `None` on overflow; a cart line that large is a bad request,
    /// not something to wrap around.
    ///
    /// ## Example
    /// ```rust
    /// use moto_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(18_500);
    /// assert_eq!(unit_price.multiply_quantity(4).unwrap().rupiah(), 74_000);
    /// assert!(Money::from_rupiah(i64::MAX).multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Checked addition.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Change owed when `self` is tendered against `total`.
    ///
    /// Never negative: a short payment records zero change. Whether a short
    /// payment is acceptable at all is the cashier screen's call.
    ///
    /// ## Example
    /// ```rust
    /// use moto_core::money::Money;
    ///
    /// let total = Money::from_rupiah(25_000);
    /// assert_eq!(Money::from_rupiah(50_000).change_for(total).rupiah(), 25_000);
    /// assert_eq!(Money::from_rupiah(20_000).change_for(total).rupiah(), 0);
    /// ```
    #[inline]
    pub fn change_for(&self, total: Money) -> Money {
        Money(self.0.saturating_sub(total.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Formats as `Rp25.000` (dot thousands separator, as printed on receipts).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}Rp{}", sign, grouped)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
