//! Infrastructure layer: record stores, the catalog service and configuration.

pub mod catalog;
pub mod config;
pub mod store;

pub use catalog::{
    ActionResult, CatalogError, CatalogResult, CatalogService, CreateProduct, CreatedProduct,
    FailureKind, ProductDetail,
};
pub use config::{CatalogConfig, ConfigError, Persistence};
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError, StoreResult};
