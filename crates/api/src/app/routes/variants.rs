use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
};

use catalog_core::VariantId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/bulk", post(bulk_update_variants))
        .route("/:id", patch(update_variant))
}

pub async fn update_variant(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateVariantRequest>, JsonRejection>,
) -> Response {
    let id: VariantId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_input(format!("invalid variant id '{id}'")),
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejected_body(rejection),
    };
    let patch = match body.into_patch() {
        Ok(p) => p,
        Err(e) => return errors::invalid_input(format!("failed to update variant: {e}")),
    };

    let result = services.catalog.update_variant_action(id, patch).await;
    errors::action_response(StatusCode::OK, result)
}

/// All rows are applied or none; a failure names no individual row.
pub async fn bulk_update_variants(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::BulkUpdateRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejected_body(rejection),
    };
    let updates = match body.into_updates() {
        Ok(u) => u,
        Err(e) => return errors::invalid_input(format!("failed to update variants: {e}")),
    };

    let result = services.catalog.bulk_update_variants_action(&updates).await;
    errors::action_response(StatusCode::OK, result)
}
