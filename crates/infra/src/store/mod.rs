//! Record store boundary for products and their variants.
//!
//! This module defines the persistence collaborator of the catalog without
//! making storage assumptions: an in-memory implementation for tests/dev and
//! a Postgres implementation for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use r#trait::{CatalogStore, StoreError, StoreResult};
