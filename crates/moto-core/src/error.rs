//! # Error Types
//!
//! Domain-specific error types for moto-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  moto-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  moto-db errors                                                        │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── EngineError      - CoreError | DbError from a unit of work        │
//! │                                                                         │
//! │  moto-api errors                                                       │
//! │  └── ApiError         - What HTTP clients see: {"error": "..."}        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → Client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line references a product id that does not exist.
    #[error("Product with id {0} not found")]
    ProductNotFound(String),

    /// Not enough stock to cover a cart line.
    ///
    /// ## Message Contract
    /// The rendered message is exactly `Insufficient stock for <name>`.
    /// The checkout screen strips that prefix to highlight the product, so
    /// the counts stay in the fields and out of the message.
    ///
    /// ```text
    /// Cart: Kampas Rem Depan × 10
    ///      │
    ///      ▼
    /// stock = 5
    ///      │
    ///      ▼
    /// "Insufficient stock for Kampas Rem Depan"
    /// ```
    #[error("Insufficient stock for {product_name}")]
    InsufficientStock {
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// Sale id does not exist.
    #[error("Transaction not found")]
    SaleNotFound(String),

    /// Return requested for a sale that was already returned.
    #[error("Transaction is already returned")]
    AlreadyReturned(String),

    /// Every generated sale id collided with an existing one.
    #[error("Could not generate a unique transaction id after {attempts} attempts")]
    IdGenerationFailed { attempts: u32 },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. non-numeric quantity, malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Cart contains no lines.
    #[error("No items in cart")]
    EmptyCart,

    /// Field may not be changed after creation.
    #[error("{field} cannot be changed")]
    Immutable { field: String },

    /// Arithmetic on the request would overflow.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
