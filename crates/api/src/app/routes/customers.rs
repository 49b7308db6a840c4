use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_customers))
}

/// Customers matching `?query=` on name or email, with invoice totals.
pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let query = q.query.unwrap_or_default();

    match services.customers.fetch_filtered_customers(&query).await {
        Ok(rows) => {
            let items = rows.iter().map(dto::customer_summary_to_json).collect::<Vec<_>>();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "items": items, "query": query })),
            )
                .into_response()
        }
        Err(e) => errors::store_error("Failed to fetch customer table.", e),
    }
}
