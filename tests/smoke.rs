// ABOUTME: End-to-end smoke test for the full newsroom lifecycle.
// ABOUTME: Tests login, publishing, share page generation, pruning, identity check, and logout.

use std::sync::Arc;

use axum::body::Body;
use http::Request;
use newsroom_server::create_router;
use newsroom_server::testing::{StubIdentityProvider, stub_state};
use tower::ServiceExt;

/// Helper to extract JSON body from a response.
async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn smoke_test_full_lifecycle() {
    // 1. State rooted in a temp dir, with an allow-listed stub identity
    let dir = tempfile::TempDir::new().unwrap();
    let home = dir.path().to_path_buf();
    let state = stub_state(&home, StubIdentityProvider::with_email("editor@example.com"));
    let share_dir = home.join("public").join("share");

    // 2. GET /api/news -> bootstraps an empty document
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/api/news").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
    assert_eq!(
        std::fs::read_to_string(home.join("data").join("news.json")).unwrap(),
        "[]"
    );

    // 3. POST /api/news without a session -> 401
    let first = serde_json::json!([
        {"id": 1, "title": "A", "excerpt": "first", "image": "https://cdn.example/a.png"},
        {"id": 2, "title": "B"}
    ]);
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::post("/api/news")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&first).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 401, "anonymous write should be rejected");

    // 4. GET /api/auth/callback?code=... -> session cookie
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::get("/api/auth/callback?code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "callback should succeed for admin");
    let set_cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    // 5. POST /api/news with the session -> persisted, share pages written
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::post("/api/news")
                .header("content-type", "application/json")
                .header("cookie", &cookie)
                .body(Body::from(serde_json::to_vec(&first).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "admin write should succeed");
    assert_eq!(json_body(resp).await, serde_json::json!({"success": true}));
    assert!(share_dir.join("1.html").exists(), "share page 1 should exist");
    assert!(share_dir.join("2.html").exists(), "share page 2 should exist");

    let page = std::fs::read_to_string(share_dir.join("1.html")).unwrap();
    assert!(page.contains("<title>A</title>"));
    assert!(page.contains(r#"content="first""#));
    assert!(page.contains("news=1"));

    // 6. Shrink the collection -> page for id 2 is pruned
    let second = serde_json::json!([{"id": 1, "title": "A", "excerpt": "first", "image": "https://cdn.example/a.png"}]);
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::post("/api/news")
                .header("content-type", "application/json")
                .header("cookie", &cookie)
                .body(Body::from(serde_json::to_vec(&second).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(share_dir.join("1.html").exists());
    assert!(
        !share_dir.join("2.html").exists(),
        "stale share page should be pruned"
    );

    // 7. Delete a share page out-of-band, GET /api/news heals it
    std::fs::remove_file(share_dir.join("1.html")).unwrap();
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::get("/api/news").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(resp).await, second);
    assert!(share_dir.join("1.html").exists(), "GET should regenerate pages");

    // 8. GET /api/auth/me with the cookie -> admin
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::get("/api/auth/me")
                .header("cookie", &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let me = json_body(resp).await;
    assert_eq!(me["isAdmin"], true);
    assert_eq!(me["user"]["email"], "editor@example.com");

    // 9. POST /api/auth/logout -> cookie cleared
    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(
        resp.headers()["set-cookie"]
            .to_str()
            .unwrap()
            .contains("Max-Age=0")
    );
}

#[tokio::test]
async fn smoke_test_rejected_login_cannot_write() {
    let dir = tempfile::TempDir::new().unwrap();
    let state = stub_state(dir.path(), StubIdentityProvider::with_email("stranger@example.com"));

    let app = create_router(Arc::clone(&state));
    let resp = app
        .oneshot(
            Request::get("/api/auth/callback?code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert!(resp.headers().get("set-cookie").is_none());

    let app = create_router(state);
    let resp = app
        .oneshot(
            Request::post("/api/news")
                .header("content-type", "application/json")
                .body(Body::from("[]"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
