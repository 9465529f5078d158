//! HTTP handlers, one module per resource.

pub mod health;
pub mod products;
pub mod reports;
pub mod shop;
pub mod transactions;
