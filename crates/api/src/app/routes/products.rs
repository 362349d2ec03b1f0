use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use catalog_core::ProductId;
use catalog_products::ProductPatch;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

fn parse_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse()
        .map_err(|_| errors::invalid_input(format!("invalid product id '{raw}'")))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejected_body(rejection),
    };
    let cmd = match body.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return errors::invalid_input(format!("failed to create product: {e}")),
    };

    let result = services.catalog.create_product_action(cmd).await;
    errors::action_response(StatusCode::CREATED, result)
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let result = services.catalog.list_products_action().await;
    errors::action_response(StatusCode::OK, result)
}

/// Product with its variants grouped by `?pivot=<option>` (first option by default).
pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::ProductDetailQuery>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services
        .catalog
        .product_detail_action(id, query.pivot.as_deref())
        .await;
    errors::action_response(StatusCode::OK, result)
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    patch: Result<Json<ProductPatch>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match patch {
        Ok(patch) => patch,
        Err(rejection) => return errors::rejected_body(rejection),
    };

    let result = services.catalog.update_product_action(id, patch).await;
    errors::action_response(StatusCode::OK, result)
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let result = services.catalog.delete_product_action(id).await;
    errors::action_response(StatusCode::OK, result)
}
