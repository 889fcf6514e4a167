// ABOUTME: News API handlers: public read and admin-only full replacement of the collection.
// ABOUTME: Both paths rebuild share pages so the derived directory heals itself.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use newsroom_core::NewsCollection;

use crate::app_state::SharedState;

/// GET /api/news - Return the full collection, regenerating share pages on the way.
///
/// Share pages are a cache: failing to refresh them is logged by the store and
/// never hides the news.
pub async fn list_news(State(state): State<SharedState>) -> Response {
    let store = Arc::clone(&state.store).lock_owned().await;

    match tokio::task::spawn_blocking(move || store.regenerate()).await {
        Ok(Ok((items, _report))) => Json(items).into_response(),
        Ok(Err(e)) => {
            tracing::error!("failed to load news: {}", e);
            server_error("failed to load news")
        }
        Err(e) => {
            tracing::error!("news load task failed: {}", e);
            server_error("failed to load news")
        }
    }
}

/// POST /api/news - Replace the whole collection. Mounted behind `AdminLayer`.
///
/// Success means the document was written; share page problems after that
/// point are logged, not reported to the client.
pub async fn replace_news(
    State(state): State<SharedState>,
    Json(items): Json<NewsCollection>,
) -> Response {
    let store = Arc::clone(&state.store).lock_owned().await;
    let count = items.len();

    match tokio::task::spawn_blocking(move || store.replace(&items)).await {
        Ok(Ok(report)) => {
            match report {
                Some(report) => tracing::info!(
                    items = count,
                    written = report.written,
                    skipped = report.skipped,
                    pruned = report.pruned,
                    "news collection replaced"
                ),
                None => tracing::warn!(items = count, "news collection replaced, share pages stale"),
            }
            Json(serde_json::json!({ "success": true })).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("failed to save news: {}", e);
            server_error("failed to save news")
        }
        Err(e) => {
            tracing::error!("news save task failed: {}", e);
            server_error("failed to save news")
        }
    }
}

fn server_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
