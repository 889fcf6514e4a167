// ABOUTME: Admin authorization gate: OAuth login round trip, allow-list check, and session reads.
// ABOUTME: Sessions live only in signed cookies; nothing is stored server-side.

use std::sync::Arc;

use chrono::Utc;
use http::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::provider::{Identity, IdentityProvider, ProviderError};
use crate::session::{Session, SessionCodec, SessionError};

/// Why a callback could not complete.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("identity provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("session: {0}")]
    Session(#[from] SessionError),
}

/// Result of the OAuth callback step.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// No authorization code: the user backed out or the provider sent an error.
    Aborted,
    /// Allow-listed identity; `token` is the signed session to hand to the browser.
    Authenticated { session: Session, token: String },
    /// Identity verified but not on the allow-list.
    Rejected { email: String },
    /// Talking to the provider (or signing the session) failed.
    Failed(CallbackError),
}

/// Response body of the identity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhoAmI {
    pub user: Value,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Gatekeeper for every mutating operation.
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
    codec: SessionCodec,
    allow_list: Vec<String>,
    redirect_uri: String,
}

impl AuthGate {
    /// Emails in `allow_list` are compared case-insensitively.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        codec: SessionCodec,
        allow_list: impl IntoIterator<Item = String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            codec,
            allow_list: allow_list
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Provider consent URL. No local state is created.
    pub fn begin_login(&self) -> Url {
        self.provider.authorization_url(&self.redirect_uri)
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.allow_list.iter().any(|allowed| *allowed == email)
    }

    /// Finish the login round trip for an authorization code.
    pub async fn complete_callback(&self, code: Option<&str>) -> CallbackOutcome {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return CallbackOutcome::Aborted;
        };

        let identity = match self.resolve_identity(code).await {
            Ok(identity) => identity,
            Err(e) => return CallbackOutcome::Failed(e.into()),
        };

        if !self.is_allowed(&identity.email) {
            return CallbackOutcome::Rejected {
                email: identity.email,
            };
        }

        let session = Session::admin(identity.profile, Utc::now());
        match self.codec.encode(&session) {
            Ok(token) => CallbackOutcome::Authenticated { session, token },
            Err(e) => CallbackOutcome::Failed(e.into()),
        }
    }

    async fn resolve_identity(&self, code: &str) -> Result<Identity, ProviderError> {
        let access_token = self.provider.exchange_code(code, &self.redirect_uri).await?;
        self.provider.fetch_identity(&access_token).await
    }

    /// Current session as seen by the client; anonymous when absent, forged, or expired.
    pub fn who_am_i(&self, headers: &HeaderMap) -> WhoAmI {
        match self.codec.read_cookie(headers) {
            Some(session) => WhoAmI {
                user: session.user,
                is_admin: session.is_admin,
            },
            None => WhoAmI {
                user: Value::Null,
                is_admin: false,
            },
        }
    }

    /// `Set-Cookie` value that ends the session. Safe to send when already logged out.
    pub fn logout(&self) -> String {
        self.codec.clear_cookie()
    }

    /// True iff the request carries a valid, unexpired admin session.
    pub fn require_admin(&self, headers: &HeaderMap) -> bool {
        self.codec
            .read_cookie(headers)
            .is_some_and(|session| session.is_admin)
    }
}
