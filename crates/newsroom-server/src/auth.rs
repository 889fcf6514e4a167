// ABOUTME: Admin session middleware for mutating newsroom routes.
// ABOUTME: Rejects requests without a valid admin session cookie before the handler runs.

use axum::Json;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::gate::AuthGate;

/// A tower Layer that requires an admin session on the wrapped service.
#[derive(Clone)]
pub struct AdminLayer {
    gate: Arc<AuthGate>,
}

impl AdminLayer {
    /// Create a new AdminLayer backed by the given gate.
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for AdminLayer {
    type Service = AdminMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminMiddleware {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// The middleware service that checks the session cookie.
#[derive(Clone)]
pub struct AdminMiddleware<S> {
    inner: S,
    gate: Arc<AuthGate>,
}

impl<S> Service<Request<Body>> for AdminMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if self.gate.require_admin(req.headers()) {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        tracing::warn!(
            "rejected unauthorized {} {}",
            req.method(),
            req.uri().path()
        );
        Box::pin(async move {
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response())
        })
    }
}
