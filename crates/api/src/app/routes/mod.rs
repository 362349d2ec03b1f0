use axum::Router;

pub mod products;
pub mod system;
pub mod variants;

/// Router for all catalog endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/variants", variants::router())
}
