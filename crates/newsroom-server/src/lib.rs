// ABOUTME: HTTP server for newsroom, providing the news REST API and OAuth admin sessions.
// ABOUTME: Uses Axum with a shared, mutex-guarded file store and signed-cookie authentication.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod gate;
pub mod provider;
pub mod routes;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use app_state::{AppState, SharedState, StateError};
pub use config::{ConfigError, NewsroomConfig};
pub use gate::{AuthGate, CallbackOutcome, WhoAmI};
pub use provider::{GoogleProvider, Identity, IdentityProvider, ProviderError};
pub use routes::create_router;
pub use session::{Session, SessionCodec};
