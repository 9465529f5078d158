//! # moto-core: Pure Business Logic for Moto POS
//!
//! This crate holds the domain model and every rule that can be expressed
//! without touching the database: money math, cart validation, id formats,
//! and the shaping of profit reports.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Moto POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Receipt ──► Records       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    moto-api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ moto-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartLine  │  │DailyProfit│  │   │
//! │  │   │   Sale    │  │           │  │ Validated │  │  fill     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            moto-db (SQLite, checkout & return engines)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleLineItem, Brand, ...)
//! - [`money`] - Money type with integer arithmetic (rupiah, no floats)
//! - [`checkout`] - Checkout request parsing and cart validation
//! - [`catalog`] - Product create/update bodies and list filters
//! - [`report`] - Profit report shaping
//! - [`ids`] - Entity id formats
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use moto_core::money::Money;
//!
//! let price = Money::from_rupiah(10_000);
//! let line = price.multiply_quantity(2).unwrap();
//! assert_eq!(line.rupiah(), 20_000);
//! assert_eq!(line.to_string(), "Rp20.000");
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Stock level below which a product counts as "low stock" on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Per-unit profit assumed when a product has no recorded buy price.
///
/// ## Business Reason
/// Much of the imported catalog was loaded without purchase prices. The
/// shop owner estimates a flat margin for those parts rather than showing
/// the full sell price as profit.
pub const DEFAULT_FALLBACK_MARGIN: i64 = 3_000;

/// How many times checkout re-rolls a colliding sale id before giving up.
pub const MAX_SALE_ID_ATTEMPTS: u32 = 5;
