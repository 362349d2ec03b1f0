//! Uniform action results for callers that must not deal with `Err`.
//!
//! Every action returns `{"success": true, ...payload}` or
//! `{"success": false, "error": "<message>"}`. Failures are logged here, once.

use serde::Serialize;
use tracing::error;

use catalog_core::{ProductId, VariantId};
use catalog_products::{Product, ProductPatch, Variant, VariantPatch, VariantUpdate};

use super::{
    CatalogError, CatalogResult, CatalogService, CreateProduct, CreatedProduct, FailureKind,
    ProductDetail,
};
use crate::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not serialized; lets the HTTP edge choose a status code.
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            failure: Some(kind),
        }
    }

    /// Convert a typed result, logging the failure under `context`.
    pub fn from_result(result: CatalogResult<T>, context: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                error!(error = %err, kind = ?err.kind(), "{context}");
                Self::failed(err.kind(), format!("{context}: {err}"))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Empty payload of actions that only report success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Acknowledged {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkUpdated {
    pub updated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// One bucket of the grouped view, by variant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketView {
    pub key: String,
    pub variant_ids: Vec<VariantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantView {
    #[serde(flatten)]
    pub variant: Variant,
    pub label: String,
}

/// Owned, serializable form of [`ProductDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetailView {
    pub product: Product,
    pub variants: Vec<VariantView>,
    pub pivot: Option<String>,
    pub groups: Vec<BucketView>,
    /// Variants whose pivot value matches no declared value.
    pub unassigned: Vec<VariantId>,
}

impl TryFrom<ProductDetail> for ProductDetailView {
    type Error = CatalogError;

    fn try_from(detail: ProductDetail) -> Result<Self, Self::Error> {
        let grouped = detail.groups()?;
        let unassigned = grouped.unassigned().iter().map(|v| v.id).collect();
        let groups = grouped
            .buckets
            .into_iter()
            .map(|bucket| BucketView {
                key: bucket.key,
                variant_ids: bucket.variants.iter().map(|v| v.id).collect(),
            })
            .collect();

        let variants = detail
            .variants
            .iter()
            .map(|v| VariantView {
                label: v.label(&detail.product.options),
                variant: v.clone(),
            })
            .collect();

        Ok(Self {
            product: detail.product,
            variants,
            pivot: detail.pivot,
            groups,
            unassigned,
        })
    }
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub async fn create_product_action(&self, input: CreateProduct) -> ActionResult<CreatedProduct> {
        ActionResult::from_result(self.create_product(input).await, "failed to create product")
    }

    pub async fn update_product_action(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> ActionResult<Acknowledged> {
        ActionResult::from_result(
            self.update_product(id, patch).await.map(|()| Acknowledged {}),
            "failed to update product",
        )
    }

    pub async fn delete_product_action(&self, id: ProductId) -> ActionResult<Acknowledged> {
        ActionResult::from_result(
            self.delete_product(id).await.map(|()| Acknowledged {}),
            "failed to delete product",
        )
    }

    pub async fn update_variant_action(
        &self,
        id: VariantId,
        patch: VariantPatch,
    ) -> ActionResult<Acknowledged> {
        ActionResult::from_result(
            self.update_variant(id, patch).await.map(|()| Acknowledged {}),
            "failed to update variant",
        )
    }

    /// A failed batch is reported as one failure; no row of it was applied.
    pub async fn bulk_update_variants_action(
        &self,
        updates: &[VariantUpdate],
    ) -> ActionResult<BulkUpdated> {
        ActionResult::from_result(
            self.bulk_update_variants(updates)
                .await
                .map(|updated| BulkUpdated { updated }),
            "failed to update variants",
        )
    }

    pub async fn list_products_action(&self) -> ActionResult<ProductList> {
        ActionResult::from_result(
            self.list_products()
                .await
                .map(|products| ProductList { products }),
            "failed to list products",
        )
    }

    pub async fn product_detail_action(
        &self,
        id: ProductId,
        pivot: Option<&str>,
    ) -> ActionResult<ProductDetailView> {
        let result = match self.product_detail(id, pivot).await {
            Ok(detail) => ProductDetailView::try_from(detail),
            Err(err) => Err(err),
        };
        ActionResult::from_result(result, "failed to load product")
    }
}
