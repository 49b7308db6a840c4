use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};

use invoicedesk_core::InvoiceId;
use invoicedesk_infra::{INVOICES_ROUTE, ITEMS_PER_PAGE, Page, total_pages};
use invoicedesk_invoicing::{InvoiceEditView, InvoiceForm};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/create", get(create_form))
        .route("/:id", post(update_invoice).delete(delete_invoice))
        .route("/:id/edit", get(edit_form))
        .route("/:id/delete", post(delete_invoice))
}

fn parse_invoice_id(raw: &str) -> Result<InvoiceId, axum::response::Response> {
    raw.parse::<InvoiceId>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"))
}

/// One page of the invoice table. Renders are cached per `(query, page)`
/// until the next successful mutation; a render that raced a mutation is
/// served but not cached.
pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<dto::ListInvoicesQuery>,
) -> axum::response::Response {
    let query = q.query.unwrap_or_default();
    let page = Page::from_param(q.page.as_deref(), ITEMS_PER_PAGE);
    let cache_key = dto::invoice_list_cache_key(&query, page);

    if let Some(cached) = services.route_cache.get(INVOICES_ROUTE, &cache_key) {
        tracing::debug!(key = %cache_key, "invoice list served from cache");
        return (StatusCode::OK, Json(cached)).into_response();
    }

    let generation = services.route_cache.generation(INVOICES_ROUTE);

    let fetched = tokio::try_join!(
        services.invoices.fetch_filtered_invoices(&query, page),
        services.invoices.count_filtered_invoices(&query),
    );
    let (rows, count) = match fetched {
        Ok(v) => v,
        Err(e) => return errors::store_error("Failed to fetch invoices.", e),
    };

    let body = dto::invoice_page_to_json(&rows, total_pages(count, ITEMS_PER_PAGE), page, &query);
    services.route_cache.put(INVOICES_ROUTE, &cache_key, body.clone(), generation);
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn create_form(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.customers.fetch_customers().await {
        Ok(customers) => (StatusCode::OK, Json(serde_json::json!({ "customers": customers }))).into_response(),
        Err(e) => errors::store_error("Failed to fetch all customers.", e),
    }
}

pub async fn edit_form(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let fetched = tokio::try_join!(
        services.invoices.fetch_invoice_by_id(&id),
        services.customers.fetch_customers(),
    );
    match fetched {
        Ok((Some(invoice), customers)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "invoice": InvoiceEditView::from(invoice),
                "customers": customers,
            })),
        )
            .into_response(),
        Ok((None, _)) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "Invoice not found."),
        Err(e) => errors::store_error("Failed to fetch invoice.", e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<InvoiceForm>,
) -> axum::response::Response {
    match services.invoice_service.create(&form).await {
        Ok(outcome) => errors::mutation_outcome_to_response(outcome),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.invoice_service.update(&id, &form).await {
        Ok(outcome) => errors::mutation_outcome_to_response(outcome),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_invoice_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.invoice_service.delete(&id).await {
        Ok(outcome) => errors::mutation_outcome_to_response(outcome),
        Err(e) => errors::mutation_error_to_response(e),
    }
}
