use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use catalog_core::{ProductId, VariantId};
use catalog_products::{Product, ProductPatch, Variant, VariantPatch, VariantUpdate};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store operation error.
///
/// These are **infrastructure errors** (missing rows, constraint violations,
/// connectivity) as opposed to domain errors (validation).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The unique SKU index rejected a write.
    #[error("sku '{0}' is already in use")]
    DuplicateSku(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("backend failure in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn product_not_found(id: ProductId) -> Self {
        Self::NotFound {
            entity: "product",
            id: id.to_string(),
        }
    }

    pub fn variant_not_found(id: VariantId) -> Self {
        Self::NotFound {
            entity: "variant",
            id: id.to_string(),
        }
    }

    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Persistence of products and variants.
///
/// ## Guarantees required from implementations
///
/// - `insert_product_with_variants` is atomic: the product and all of its
///   initial variants are stored, or nothing is.
/// - `update_variants` is atomic: every row of the batch is updated, or none is.
/// - `sku` is unique across all variants of all products; a write that would
///   break this fails with [`StoreError::DuplicateSku`].
/// - `delete_product` removes the product's variants as well.
/// - Updates of a missing row fail with [`StoreError::NotFound`].
///
/// ## Ordering
///
/// - `list_products`: newest first.
/// - `find_variants_by_product`: newest first; variants created together keep
///   the order they were inserted in.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product_with_variants(
        &self,
        product: &Product,
        variants: &[Variant],
    ) -> StoreResult<()>;

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn update_variant(
        &self,
        id: VariantId,
        patch: &VariantPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn update_variants(&self, updates: &[VariantUpdate], at: DateTime<Utc>)
    -> StoreResult<()>;

    async fn find_variants_by_product(&self, product_id: ProductId) -> StoreResult<Vec<Variant>>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert_product_with_variants(
        &self,
        product: &Product,
        variants: &[Variant],
    ) -> StoreResult<()> {
        (**self).insert_product_with_variants(product, variants).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        (**self).update_product(id, patch, at).await
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        (**self).delete_product(id).await
    }

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).find_product(id).await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        (**self).list_products().await
    }

    async fn update_variant(
        &self,
        id: VariantId,
        patch: &VariantPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        (**self).update_variant(id, patch, at).await
    }

    async fn update_variants(
        &self,
        updates: &[VariantUpdate],
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        (**self).update_variants(updates, at).await
    }

    async fn find_variants_by_product(&self, product_id: ProductId) -> StoreResult<Vec<Variant>> {
        (**self).find_variants_by_product(product_id).await
    }
}
