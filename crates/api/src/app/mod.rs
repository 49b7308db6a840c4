//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, authenticator, mutation service and session codec
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};
use tower::ServiceBuilder;

use invoicedesk_auth::RouteGate;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_app_with(services))
}

/// Build the router around already-wired services.
pub fn build_app_with(services: AppServices) -> Router {
    let gate_state = middleware::GateState {
        sessions: Arc::new(services.sessions.clone()),
        gate: RouteGate::default(),
    };
    let services = Arc::new(services);

    Router::new()
        .route("/api/health", get(routes::system::health))
        .route("/api/auth/signout", post(routes::login::sign_out))
        .route("/login", get(routes::login::login_page).post(routes::login::sign_in))
        .route("/dashboard", get(routes::system::overview))
        .nest("/dashboard/invoices", routes::invoices::router())
        .nest("/dashboard/customers", routes::customers::router())
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
                gate_state,
                middleware::session_gate,
            )),
        )
}
