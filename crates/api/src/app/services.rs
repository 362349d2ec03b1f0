use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use catalog_infra::{
    CatalogConfig, CatalogService, CatalogStore, InMemoryCatalogStore, Persistence,
    PostgresCatalogStore,
};

pub type DynCatalogStore = Arc<dyn CatalogStore>;

/// Shared state handed to every handler.
pub struct AppServices {
    pub catalog: CatalogService<DynCatalogStore>,
}

/// Select the record store from configuration and wire the catalog service.
///
/// - `Persistence::InMemory`: process-local store (dev/tests)
/// - `Persistence::Postgres`: connects, then creates the schema if missing
pub async fn build_services(config: &CatalogConfig) -> anyhow::Result<AppServices> {
    let store: DynCatalogStore = match &config.persistence {
        Persistence::InMemory => {
            tracing::info!("using in-memory catalog store");
            Arc::new(InMemoryCatalogStore::new())
        }
        Persistence::Postgres { database_url } => {
            let pool = PgPool::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            let store = PostgresCatalogStore::new(pool);
            store
                .migrate()
                .await
                .context("failed to apply catalog schema")?;
            tracing::info!("using Postgres catalog store");
            Arc::new(store)
        }
    };

    let catalog = CatalogService::new(store)
        .with_limits(config.variant_limits)
        .with_drift_policy(config.drift_policy);

    Ok(AppServices { catalog })
}
