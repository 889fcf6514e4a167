// ABOUTME: Test utilities for newsroom-server: a stub identity provider and temp-dir app state.
// ABOUTME: Used in tests to drive the OAuth callback and admin routes without real network calls.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use newsroom_store::{NewsStore, ShareDirectory, ShareRetention};
use serde_json::Value;
use url::Url;

use crate::app_state::{AppState, SharedState};
use crate::gate::AuthGate;
use crate::provider::{Identity, IdentityProvider, ProviderError};
use crate::session::{SESSION_COOKIE, Session, SessionCodec};

/// A stub identity provider that returns a fixed profile for any code.
#[derive(Debug, Clone)]
pub struct StubIdentityProvider {
    profile: Option<Value>,
}

impl StubIdentityProvider {
    /// Create a stub that resolves every code to the given email.
    pub fn with_email(email: &str) -> Self {
        Self {
            profile: Some(serde_json::json!({
                "id": "stub-user",
                "email": email,
                "name": "Stub User",
            })),
        }
    }

    /// Create a stub whose token exchange always fails.
    pub fn failing() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn authorization_url(&self, redirect_uri: &str) -> Url {
        let mut url =
            Url::parse("https://accounts.stub.test/o/oauth2/v2/auth").expect("static URL parses");
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code");
        url
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<String, ProviderError> {
        match self.profile {
            Some(_) => Ok(format!("stub-token-{}", code)),
            None => Err(ProviderError::Status {
                endpoint: "token",
                status: 500,
            }),
        }
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<Identity, ProviderError> {
        let profile = self.profile.clone().ok_or(ProviderError::MissingEmail)?;
        Identity::from_profile(profile)
    }
}

/// Secret used by `stub_state` to sign sessions.
pub const STUB_SESSION_SECRET: &str = "stub-session-secret";

/// Email that `stub_state` puts on the allow-list.
pub const STUB_ADMIN_EMAIL: &str = "editor@example.com";

/// Build application state rooted at `home` (data/news.json and public/share)
/// with the given provider and `STUB_ADMIN_EMAIL` as the only admin.
pub fn stub_state(home: &Path, provider: StubIdentityProvider) -> SharedState {
    let public_dir = home.join("public");
    let shares = ShareDirectory::new(public_dir.join("share"), ShareRetention::Prune);
    let store = NewsStore::open(home.join("data").join("news.json"), shares)
        .expect("store opens in test directory");
    let auth = AuthGate::new(
        Arc::new(provider),
        SessionCodec::new(STUB_SESSION_SECRET, true),
        vec![STUB_ADMIN_EMAIL.to_string()],
        "http://localhost:3000/api/auth/callback",
    );
    Arc::new(AppState::new(
        store,
        auth,
        public_dir,
        "http://localhost:3000".to_string(),
    ))
}

/// A `Cookie` header value carrying a fresh admin session for `state`.
pub fn admin_cookie(state: &SharedState) -> String {
    let session = Session::admin(serde_json::json!({ "email": STUB_ADMIN_EMAIL }), Utc::now());
    let token = state
        .auth
        .codec()
        .encode(&session)
        .expect("stub session encodes");
    format!("{}={}", SESSION_COOKIE, token)
}
