use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use catalog_infra::catalog::Acknowledged;
use catalog_infra::{ActionResult, FailureKind};

pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::Validation => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Conflict => StatusCode::CONFLICT,
        FailureKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render an action result: `success_status` on success, the failure's status otherwise.
pub fn action_response<T: Serialize>(success_status: StatusCode, result: ActionResult<T>) -> Response {
    let status = match result.failure {
        Some(kind) => status_for(kind),
        None => success_status,
    };
    (status, axum::Json(result)).into_response()
}

/// `{success:false, error}` for input rejected at the HTTP edge.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ActionResult::<Acknowledged>::failed(FailureKind::Validation, message);
    (status, axum::Json(body)).into_response()
}

pub fn invalid_input(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, message)
}

/// A body that failed to parse or deserialize is a validation failure.
pub fn rejected_body(rejection: JsonRejection) -> Response {
    invalid_input(format!("invalid request body: {}", rejection.body_text()))
}
