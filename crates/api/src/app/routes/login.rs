use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;

use invoicedesk_auth::{LOGIN_PATH, PROTECTED_PREFIX};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::middleware::{clear_session_cookie_header, session_cookie_header};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const SOMETHING_WENT_WRONG: &str = "Something went wrong.";

pub async fn login_page(Query(q): Query<dto::LoginPageQuery>) -> impl IntoResponse {
    let callback_url = dto::safe_callback(q.callback_url.as_deref(), PROTECTED_PREFIX);
    Json(serde_json::json!({
        "page": "login",
        "callbackUrl": callback_url,
    }))
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<dto::LoginForm>,
) -> Response {
    let user = match services
        .authenticator
        .authenticate(form.email.as_deref(), form.password.as_deref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", INVALID_CREDENTIALS);
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", SOMETHING_WENT_WRONG);
        }
    };

    let token = match services.sessions.issue(&user, Utc::now()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", SOMETHING_WENT_WRONG);
        }
    };

    tracing::info!(user_id = %user.id, "signed in");

    let target = dto::safe_callback(form.callback_url.as_deref(), PROTECTED_PREFIX);
    let cookie = session_cookie_header(&token, services.sessions.ttl().num_seconds());
    ([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response()
}

pub async fn sign_out() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie_header())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}
