use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_core::{ProductId, VariantId};
use catalog_products::{Product, ProductPatch, Variant, VariantPatch, VariantUpdate};

use super::r#trait::{CatalogStore, StoreError, StoreResult};

/// A stored record plus its insertion sequence, used to break `created_at` ties.
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Row<Product>>,
    variants: HashMap<VariantId, Row<Variant>>,
    skus: HashMap<String, VariantId>,
    next_seq: u64,
}

impl CatalogState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Fails when `sku` belongs to a variant other than `owner`.
    fn check_sku(
        skus: &HashMap<String, VariantId>,
        sku: &str,
        owner: Option<VariantId>,
    ) -> StoreResult<()> {
        match skus.get(sku) {
            Some(existing) if Some(*existing) != owner => {
                Err(StoreError::DuplicateSku(sku.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn apply_variant_patch(&mut self, id: VariantId, patch: &VariantPatch, at: DateTime<Utc>) {
        let Some(row) = self.variants.get_mut(&id) else {
            return;
        };
        if let Some(sku) = &patch.sku {
            self.skus.remove(&row.record.sku);
            self.skus.insert(sku.clone(), id);
        }
        row.record.apply(patch, at);
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. Every write takes the single write lock, so
/// multi-row writes are trivially atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_product_with_variants(
        &self,
        product: &Product,
        variants: &[Variant],
    ) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;

        if state.products.contains_key(&product.id) {
            return Err(StoreError::backend(
                "insert_product",
                format!("product {} already exists", product.id),
            ));
        }

        // Validate the whole batch before touching anything.
        let mut staged: HashMap<&str, VariantId> = HashMap::new();
        for variant in variants {
            if variant.product_id != product.id {
                return Err(StoreError::NotFound {
                    entity: "product",
                    id: variant.product_id.to_string(),
                });
            }
            CatalogState::check_sku(&state.skus, &variant.sku, None)?;
            if staged.insert(variant.sku.as_str(), variant.id).is_some() {
                return Err(StoreError::DuplicateSku(variant.sku.clone()));
            }
        }

        let seq = state.next_seq();
        state.products.insert(
            product.id,
            Row {
                seq,
                record: product.clone(),
            },
        );
        for variant in variants {
            let seq = state.next_seq();
            state.skus.insert(variant.sku.clone(), variant.id);
            state.variants.insert(
                variant.id,
                Row {
                    seq,
                    record: variant.clone(),
                },
            );
        }
        Ok(())
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let row = state
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::product_not_found(id))?;
        row.record.apply(patch, at);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        if state.products.remove(&id).is_none() {
            return Err(StoreError::product_not_found(id));
        }

        let owned: Vec<VariantId> = state
            .variants
            .values()
            .filter(|row| row.record.product_id == id)
            .map(|row| row.record.id)
            .collect();
        for variant_id in owned {
            if let Some(row) = state.variants.remove(&variant_id) {
                state.skus.remove(&row.record.sku);
            }
        }
        Ok(())
    }

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.products.get(&id).map(|row| row.record.clone()))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows: Vec<&Row<Product>> = state.products.values().collect();
        rows.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(|row| row.record.clone()).collect())
    }

    async fn update_variant(
        &self,
        id: VariantId,
        patch: &VariantPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        if !state.variants.contains_key(&id) {
            return Err(StoreError::variant_not_found(id));
        }
        if let Some(sku) = &patch.sku {
            CatalogState::check_sku(&state.skus, sku, Some(id))?;
        }
        state.apply_variant_patch(id, patch, at);
        Ok(())
    }

    async fn update_variants(
        &self,
        updates: &[VariantUpdate],
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;

        // Replay the batch against a scratch SKU index; apply only if every row passes.
        let mut skus = state.skus.clone();
        let mut current: HashMap<VariantId, String> = HashMap::new();
        for update in updates {
            let Some(row) = state.variants.get(&update.id) else {
                return Err(StoreError::variant_not_found(update.id));
            };
            if let Some(sku) = &update.patch.sku {
                CatalogState::check_sku(&skus, sku, Some(update.id))?;
                let previous = current
                    .get(&update.id)
                    .cloned()
                    .unwrap_or_else(|| row.record.sku.clone());
                skus.remove(&previous);
                skus.insert(sku.clone(), update.id);
                current.insert(update.id, sku.clone());
            }
        }

        state.skus = skus;
        for update in updates {
            if let Some(row) = state.variants.get_mut(&update.id) {
                row.record.apply(&update.patch, at);
            }
        }
        Ok(())
    }

    async fn find_variants_by_product(&self, product_id: ProductId) -> StoreResult<Vec<Variant>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut rows: Vec<&Row<Variant>> = state
            .variants
            .values()
            .filter(|row| row.record.product_id == product_id)
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(a.seq.cmp(&b.seq))
        });
        Ok(rows.into_iter().map(|row| row.record.clone()).collect())
    }
}
