// ABOUTME: Route definitions for the newsroom HTTP API and static public directory.
// ABOUTME: Assembles API routes, the admin gate on writes, and request tracing into one Router.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;
use crate::auth::AdminLayer;

/// Largest accepted request body (the whole collection is posted at once).
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the complete Axum router with all routes and shared state.
///
/// Anything that is not an API route is served from the public directory,
/// which is where share pages land (`/share/<id>.html`).
pub fn create_router(state: SharedState) -> Router {
    let admin = AdminLayer::new(Arc::clone(&state.auth));
    let public = ServeDir::new(&state.public_dir);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/news",
            get(api::news::list_news).post(api::news::replace_news.layer(admin)),
        )
        .route("/api/auth/google", get(api::auth::login))
        .route("/api/auth/callback", get(api::auth::callback))
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/auth/logout", post(api::auth::logout))
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubIdentityProvider, admin_cookie, stub_state};
    use axum::body::Body;
    use http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_returns_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = create_router(stub_state(dir.path(), StubIdentityProvider::failing()));
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn share_pages_are_served_from_public_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = stub_state(dir.path(), StubIdentityProvider::failing());
        let body = serde_json::json!([{"id": 7, "title": "Seven", "image": "https://cdn.example/7.png"}]);

        let resp = create_router(Arc::clone(&state))
            .oneshot(
                Request::post("/api/news")
                    .header("content-type", "application/json")
                    .header("cookie", admin_cookie(&state))
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = create_router(state)
            .oneshot(Request::get("/share/7.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let html = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains(r#"<meta property="og:image" content="https://cdn.example/7.png">"#));
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_404() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = create_router(stub_state(dir.path(), StubIdentityProvider::failing()));

        let resp = app
            .oneshot(Request::get("/share/missing.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 404);
    }
}
