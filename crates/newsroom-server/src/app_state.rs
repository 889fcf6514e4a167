// ABOUTME: Shared application state for the newsroom HTTP server.
// ABOUTME: Holds the single-writer news store, the auth gate, and static hosting settings.

use std::path::PathBuf;
use std::sync::Arc;

use newsroom_store::{NewsStore, ShareDirectory, StoreError};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::{ConfigError, NewsroomConfig};
use crate::gate::AuthGate;
use crate::provider::{GoogleProvider, ProviderError};
use crate::session::SessionCodec;

/// Errors that can occur while assembling the state from configuration.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    /// All store access goes through this lock, so one process never runs two
    /// document writes or share regenerations at the same time. Handlers take
    /// an owned guard so the blocking file work can move to the blocking pool.
    pub store: Arc<Mutex<NewsStore>>,
    pub auth: Arc<AuthGate>,
    pub public_dir: PathBuf,
    /// Origin the login popup posts its success message to.
    pub app_origin: String,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: NewsStore, auth: AuthGate, public_dir: PathBuf, app_origin: String) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            auth: Arc::new(auth),
            public_dir,
            app_origin,
        }
    }

    /// Build production state: Google provider, signed sessions, file store.
    pub fn from_config(config: &NewsroomConfig) -> Result<Self, StateError> {
        let secret = config.require_session_secret()?;
        let provider = GoogleProvider::new(config.google.clone())?;
        let auth = AuthGate::new(
            Arc::new(provider),
            SessionCodec::new(secret, config.cookie_secure),
            config.authorized_emails.clone(),
            config.redirect_uri(),
        );

        let shares = ShareDirectory::new(config.share_dir(), config.share_retention);
        let store = NewsStore::open(config.data_file.clone(), shares)?;

        Ok(Self::new(
            store,
            auth,
            config.public_dir.clone(),
            config.app_origin(),
        ))
    }
}
