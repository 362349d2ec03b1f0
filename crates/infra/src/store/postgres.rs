//! Postgres-backed catalog store.
//!
//! Products live in `products`, variants in `product_variants` (see
//! `migrations/0001_catalog.sql`). Options and attributes are stored as JSONB;
//! prices as `BIGINT` minor units.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateSku` |
//! | Database (foreign key violation) | `23503` | `NotFound` (product) |
//! | Database (check constraint violation) | `23514` | `Backend` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use catalog_core::{ProductId, VariantId};
use catalog_products::{
    Attributes, MinorUnits, Product, ProductOption, ProductPatch, Variant, VariantPatch,
    VariantUpdate,
};

use super::r#trait::{CatalogStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

/// Postgres catalog store.
///
/// Multi-row writes (product creation, bulk variant updates) run in one
/// transaction each. SKU uniqueness and the product → variant cascade are
/// enforced by the schema.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the catalog tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn apply_variant_patch(
        tx: &mut Transaction<'_, Postgres>,
        id: VariantId,
        patch: &VariantPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let price = patch.price.map(price_to_db).transpose()?;
        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET sku = COALESCE($2, sku),
                price = COALESCE($3, price),
                stock = COALESCE($4, stock),
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.sku.as_deref())
        .bind(price)
        .bind(patch.stock.map(i64::from))
        .bind(at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateSku(patch.sku.clone().unwrap_or_default())
            } else {
                map_sqlx_error("update_variant", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::variant_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(
        skip(self, product, variants),
        fields(product_id = %product.id, variant_count = variants.len()),
        err
    )]
    async fn insert_product_with_variants(
        &self,
        product: &Product,
        variants: &[Variant],
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, options, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(Json(&product.options))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        for (position, variant) in variants.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::backend("insert_variant", "too many variants"))?;
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    id, product_id, sku, price, stock, attributes, position, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(variant.id.as_uuid())
            .bind(variant.product_id.as_uuid())
            .bind(&variant.sku)
            .bind(price_to_db(variant.price)?)
            .bind(i64::from(variant.stock))
            .bind(Json(&variant.attributes))
            .bind(position)
            .bind(variant.created_at)
            .bind(variant.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateSku(variant.sku.clone())
                } else {
                    map_sqlx_error("insert_variant", e)
                }
            })?;
        }

        // Dropping the transaction on any error above rolls it back.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::product_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::product_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, options, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_count = tracing::field::Empty), err)]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, options, created_at, updated_at
            FROM products
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Span::current().record("product_count", rows.len());
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, patch), fields(variant_id = %id), err)]
    async fn update_variant(
        &self,
        id: VariantId,
        patch: &VariantPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Self::apply_variant_patch(&mut tx, id, patch, at).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self, updates), fields(update_count = updates.len()), err)]
    async fn update_variants(
        &self,
        updates: &[VariantUpdate],
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for update in updates {
            if let Err(err) = Self::apply_variant_patch(&mut tx, update.id, &update.patch, at).await
            {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err);
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn find_variants_by_product(&self, product_id: ProductId) -> StoreResult<Vec<Variant>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, sku, price, stock, attributes, created_at, updated_at
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at DESC, position ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_variants_by_product", e))?;

        rows.iter().map(variant_from_row).collect()
    }
}

fn price_to_db(price: MinorUnits) -> StoreResult<i64> {
    i64::try_from(price.get())
        .map_err(|_| StoreError::backend("encode_price", format!("price {} out of range", price.get())))
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let decode = |e: sqlx::Error| StoreError::backend("decode_product", e.to_string());
    let Json(options): Json<Vec<ProductOption>> = row.try_get("options").map_err(decode)?;
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        options,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

fn variant_from_row(row: &PgRow) -> StoreResult<Variant> {
    let decode = |e: sqlx::Error| StoreError::backend("decode_variant", e.to_string());
    let Json(attributes): Json<Attributes> = row.try_get("attributes").map_err(decode)?;
    let price: i64 = row.try_get("price").map_err(decode)?;
    let stock: i64 = row.try_get("stock").map_err(decode)?;
    Ok(Variant {
        id: VariantId::from_uuid(row.try_get("id").map_err(decode)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(decode)?),
        sku: row.try_get("sku").map_err(decode)?,
        price: u64::try_from(price)
            .map(MinorUnits::new)
            .map_err(|_| StoreError::backend("decode_variant", format!("negative price {price}")))?,
        stock: u32::try_from(stock)
            .map_err(|_| StoreError::backend("decode_variant", format!("stock {stock} out of range")))?,
        attributes,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::DuplicateSku(msg),
                Some("23503") => StoreError::NotFound {
                    entity: "product",
                    id: msg,
                },
                _ => StoreError::backend(operation, msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23505");
    }
    false
}
