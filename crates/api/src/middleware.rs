//! Session gate middleware.
//!
//! Runs the route gate on every request the matcher covers. A verified
//! session is attached to the request as a [`SessionContext`]; a missing or
//! invalid one counts as "no session".

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use invoicedesk_auth::{RouteDecision, RouteGate, SessionClaims, SessionValidator, gate_applies};

use crate::context::SessionContext;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct GateState {
    pub sessions: Arc<dyn SessionValidator>,
    pub gate: RouteGate,
}

pub async fn session_gate(
    State(state): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if !gate_applies(&path) {
        return next.run(req).await;
    }

    let session = current_session(&state, req.headers());

    match state.gate.decide(session.is_some(), &path) {
        RouteDecision::Allow => {
            if let Some(claims) = session {
                req.extensions_mut().insert(SessionContext::from(claims));
            }
            next.run(req).await
        }
        RouteDecision::Deny => {
            let original = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or(path.as_str());
            tracing::debug!(path = %path, "no session; redirecting to sign-in");
            Redirect::to(&state.gate.login_redirect(original)).into_response()
        }
        RouteDecision::Redirect(target) => Redirect::to(&target).into_response(),
    }
}

fn current_session(state: &GateState, headers: &HeaderMap) -> Option<SessionClaims> {
    let token = extract_token(headers)?;
    match state.sessions.validate(token, Utc::now()) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session");
            None
        }
    }
}

/// Session token from the `session` cookie, falling back to a bearer token.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    session_cookie(headers).or_else(|| extract_bearer(headers))
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value clearing the session.
pub fn clear_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
