// ABOUTME: Auth API handlers: provider redirect, OAuth callback, identity check, and logout.
// ABOUTME: A successful callback sets the signed session cookie and notifies the opener window.

use askama::Template;
use askama_derive_axum::IntoResponse as AskamaIntoResponse;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::app_state::SharedState;
use crate::gate::{CallbackOutcome, WhoAmI};

const ACCESS_DENIED: &str = "Acesso negado. E-mail não autorizado.";
const AUTH_FAILED: &str = "Erro na autenticação.";

/// Page returned to the login popup after a successful callback.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "auth_success.html")]
pub struct AuthSuccessTemplate {
    pub origin: String,
}

/// Query string of the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /api/auth/google - Redirect to the provider's consent page.
pub async fn login(State(state): State<SharedState>) -> Response {
    found(state.auth.begin_login().as_str())
}

/// GET /api/auth/callback - Complete the OAuth round trip.
pub async fn callback(
    State(state): State<SharedState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match state.auth.complete_callback(params.code.as_deref()).await {
        CallbackOutcome::Aborted => {
            tracing::debug!("oauth callback without code, redirecting home");
            found("/")
        }
        CallbackOutcome::Authenticated { session, token } => {
            tracing::info!(
                "admin login for {}",
                session.user["email"].as_str().unwrap_or("<unknown>")
            );
            let page = AuthSuccessTemplate {
                origin: state.app_origin.clone(),
            };
            (
                [(header::SET_COOKIE, state.auth.codec().set_cookie(&token))],
                page,
            )
                .into_response()
        }
        CallbackOutcome::Rejected { email } => {
            tracing::warn!("login rejected for non-authorized email {}", email);
            (StatusCode::FORBIDDEN, ACCESS_DENIED).into_response()
        }
        CallbackOutcome::Failed(e) => {
            tracing::error!("oauth callback failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, AUTH_FAILED).into_response()
        }
    }
}

/// GET /api/auth/me - Report the current session.
pub async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Json<WhoAmI> {
    Json(state.auth.who_am_i(&headers))
}

/// POST /api/auth/logout - Drop the session cookie. Always succeeds.
pub async fn logout(State(state): State<SharedState>) -> Response {
    (
        [(header::SET_COOKIE, state.auth.logout())],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}
