//! # Repository Module
//!
//! Database repository implementations for Moto POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.products().list(&filter)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── list(&self, filter)                                                │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── insert(&self, product)                                             │
//! │  └── update(&self, id, changes)                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statements that take part in a checkout or return are also exposed as
//! free functions over any `SqliteExecutor`, so the engines can run them on
//! an open transaction.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD, filters, stock
//! - [`SaleRepository`](sale::SaleRepository) - Sales and line items
//! - [`ShopRepository`](shop::ShopRepository) - Store metadata singleton
//! - [`ReportRepository`](report::ReportRepository) - Dashboard and profit aggregates

pub mod product;
pub mod report;
pub mod sale;
pub mod shop;
