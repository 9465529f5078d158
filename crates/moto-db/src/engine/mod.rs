//! # Units of Work
//!
//! The two operations that move stock, each run as one SQLite transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutEngine::checkout                                               │
//! │    BEGIN                                                                │
//! │    INSERT sale (SUCCESS)          ← first statement takes the write lock│
//! │    per line: find product → conditional decrement → INSERT line item    │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  ReturnEngine::return_sale                                              │
//! │    BEGIN                                                                │
//! │    UPDATE sale SUCCESS → RETURNED ← compare-and-set, first statement    │
//! │    per line item: increment stock (missing product: warn, skip)         │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error returns before `commit()`, and dropping an uncommitted
//! `Transaction` rolls it back. Nothing is ever half-written.

use thiserror::Error;

use crate::error::DbError;
use moto_core::{CoreError, ValidationError};

pub mod checkout;
pub mod reversal;

pub use checkout::CheckoutEngine;
pub use reversal::ReturnEngine;

/// Failure of a checkout or return.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed underneath the operation.
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(DbError::from(err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
