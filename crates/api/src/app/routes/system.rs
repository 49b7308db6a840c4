use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app::errors;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Dashboard landing document for the signed-in user.
pub async fn overview(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": {
            "id": session.user_id(),
            "name": session.name(),
            "email": session.email(),
        },
        "sessionExpiresAt": session.expires_at(),
    }))
}

pub async fn not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}
