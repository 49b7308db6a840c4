use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use invoicedesk_infra::{MutationError, MutationOutcome};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn mutation_outcome_to_response(outcome: MutationOutcome) -> Response {
    match outcome {
        MutationOutcome::Redirect(path) => Redirect::to(&path).into_response(),
        MutationOutcome::Deleted { message } => {
            (StatusCode::OK, Json(json!({ "message": message }))).into_response()
        }
    }
}

pub fn mutation_error_to_response(err: MutationError) -> Response {
    match err {
        MutationError::Validation(failure) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "validation_error",
                "errors": failure.field_errors,
                "message": failure.message,
            })),
        )
            .into_response(),
        MutationError::Persistence { message } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", message)
        }
    }
}

/// Read-path store failure. Details go to the log, not the client.
pub fn store_error(context: &'static str, err: impl std::fmt::Display) -> Response {
    tracing::error!(error = %err, "{context}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", context)
}
