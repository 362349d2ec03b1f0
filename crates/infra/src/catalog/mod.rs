//! Catalog application service.
//!
//! `CatalogService` composes the pure product rules (option validation,
//! variant generation, grouping) with an injected [`CatalogStore`]. The typed
//! methods here return [`CatalogResult`]; the serializable action wrappers that
//! never fail live in [`actions`].

pub mod actions;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use catalog_core::{DomainError, DomainResult, ProductId, VariantId};
use catalog_products::{
    DriftPolicy, MinorUnits, NewProduct, Product, ProductOption, ProductPatch, Variant,
    VariantCountLevel, VariantEditSession, VariantGenerator, VariantGroups, VariantLimits,
    VariantPatch, VariantUpdate, group,
};

use crate::store::{CatalogStore, StoreError};

pub use actions::{
    Acknowledged, ActionResult, BucketView, BulkUpdated, ProductDetailView, ProductList,
    VariantView,
};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure of a catalog operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    /// The referenced product or variant does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The store failed (constraint violation, connectivity, ...).
    #[error(transparent)]
    Persistence(StoreError),
}

/// Coarse failure class, used to pick a status code at the HTTP edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
}

impl CatalogError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CatalogError::Validation(_) => FailureKind::Validation,
            CatalogError::NotFound(_) => FailureKind::NotFound,
            CatalogError::Persistence(StoreError::DuplicateSku(_)) => FailureKind::Conflict,
            CatalogError::Persistence(_) => FailureKind::Persistence,
        }
    }

    fn product_not_found(id: ProductId) -> Self {
        CatalogError::NotFound(format!("product {id} not found"))
    }
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                CatalogError::Validation(msg)
            }
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { .. } => CatalogError::NotFound(value.to_string()),
            other => CatalogError::Persistence(other),
        }
    }
}

/// Input of [`CatalogService::create_product`].
///
/// `base_price` is already in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    pub base_price: MinorUnits,
    pub base_stock: u32,
}

/// A freshly created product and its initial variants, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedProduct {
    pub product: Product,
    pub variants: Vec<Variant>,
}

/// A product, its variants and the pivot they are grouped by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<Variant>,
    /// `None` when the product has no options.
    pub pivot: Option<String>,
    pub drift_policy: DriftPolicy,
}

impl ProductDetail {
    pub fn groups(&self) -> DomainResult<VariantGroups<'_>> {
        group(
            &self.variants,
            &self.product.options,
            self.pivot.as_deref(),
            self.drift_policy,
        )
    }
}

/// Product catalog operations over a record store.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
    generator: VariantGenerator,
    drift_policy: DriftPolicy,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            generator: VariantGenerator::default(),
            drift_policy: DriftPolicy::default(),
        }
    }

    pub fn with_limits(mut self, limits: VariantLimits) -> Self {
        self.generator = VariantGenerator::new(limits);
        self
    }

    pub fn with_drift_policy(mut self, policy: DriftPolicy) -> Self {
        self.drift_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &VariantLimits {
        self.generator.limits()
    }

    pub fn drift_policy(&self) -> DriftPolicy {
        self.drift_policy
    }

    /// Create a product together with one variant per option combination.
    ///
    /// The product and its variants are stored as one unit; on failure neither
    /// exists afterwards.
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<CreatedProduct> {
        let CreateProduct {
            name,
            description,
            options,
            base_price,
            base_stock,
        } = input;

        let new_product = NewProduct {
            name,
            description,
            options,
        };
        new_product.validate()?;

        let count = self.limits().check(&new_product.options)?;
        match self.limits().assess(count) {
            VariantCountLevel::Normal => {}
            VariantCountLevel::Large => {
                warn!(variant_count = count, "large number of variants requested")
            }
            VariantCountLevel::Excessive => {
                warn!(variant_count = count, "excessive number of variants requested")
            }
        }

        let now = Utc::now();
        let product = new_product.into_product(ProductId::new(), now);
        let variants: Vec<Variant> = self
            .generator
            .generate(&product, base_price, base_stock)?
            .into_iter()
            .map(|v| v.into_variant(VariantId::new(), now))
            .collect();

        self.store
            .insert_product_with_variants(&product, &variants)
            .await?;

        info!(
            product_id = %product.id,
            variant_count = variants.len(),
            "product created"
        );
        Ok(CreatedProduct { product, variants })
    }

    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> CatalogResult<()> {
        patch.validate()?;
        let patch = ProductPatch {
            name: patch.name.map(|n| n.trim().to_string()),
            description: patch.description,
        };
        self.store.update_product(id, &patch, Utc::now()).await?;
        debug!(product_id = %id, "product updated");
        Ok(())
    }

    /// Delete a product; its variants go with it.
    pub async fn delete_product(&self, id: ProductId) -> CatalogResult<()> {
        self.store.delete_product(id).await?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn update_variant(&self, id: VariantId, patch: VariantPatch) -> CatalogResult<()> {
        patch.validate()?;
        self.store.update_variant(id, &patch, Utc::now()).await?;
        debug!(variant_id = %id, "variant updated");
        Ok(())
    }

    /// Apply a batch of variant updates atomically.
    ///
    /// Any failure (validation, unknown id, duplicate SKU, store error) leaves
    /// every row of the batch unchanged. Returns the number of rows updated.
    pub async fn bulk_update_variants(&self, updates: &[VariantUpdate]) -> CatalogResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        for update in updates {
            update.patch.validate()?;
        }

        self.store.update_variants(updates, Utc::now()).await?;
        info!(update_count = updates.len(), "variants bulk updated");
        Ok(updates.len())
    }

    pub async fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(id))
    }

    /// All products, newest first.
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// Variants of an existing product, newest first.
    pub async fn list_variants(&self, product_id: ProductId) -> CatalogResult<Vec<Variant>> {
        self.get_product(product_id).await?;
        Ok(self.store.find_variants_by_product(product_id).await?)
    }

    /// A product with its variants, grouped by `pivot` (or by the first
    /// declared option when `pivot` is `None`).
    pub async fn product_detail(
        &self,
        id: ProductId,
        pivot: Option<&str>,
    ) -> CatalogResult<ProductDetail> {
        let product = self.get_product(id).await?;

        let pivot = match pivot {
            Some(name) => {
                let option = product.option(name).ok_or_else(|| {
                    CatalogError::Validation(format!("unknown pivot option '{name}'"))
                })?;
                Some(option.name.clone())
            }
            None => product.default_pivot().map(|o| o.name.clone()),
        };

        let variants = self.store.find_variants_by_product(id).await?;
        let detail = ProductDetail {
            product,
            variants,
            pivot,
            drift_policy: self.drift_policy,
        };

        for variant in detail.groups()?.unassigned() {
            warn!(
                product_id = %id,
                variant_id = %variant.id,
                sku = %variant.sku,
                "variant attributes do not match declared option values"
            );
        }

        Ok(detail)
    }

    /// Open an editing session over a product's current variants.
    pub async fn edit_session(&self, product_id: ProductId) -> CatalogResult<VariantEditSession> {
        Ok(VariantEditSession::new(
            self.list_variants(product_id).await?,
        ))
    }

    /// Save a session's dirty rows as one bulk update.
    pub async fn commit_session(&self, session: &mut VariantEditSession) -> CatalogResult<usize> {
        session
            .commit(move |updates| async move {
                self.bulk_update_variants(&updates).await.map(|_| ())
            })
            .await
    }
}
