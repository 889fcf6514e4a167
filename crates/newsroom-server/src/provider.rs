// ABOUTME: OAuth identity provider abstraction and the Google implementation over reqwest.
// ABOUTME: Builds the consent URL, exchanges authorization codes, and fetches the user's identity.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Errors that can occur while talking to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} endpoint returned status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("token response did not include an access_token")]
    MissingAccessToken,

    #[error("identity response did not include an email")]
    MissingEmail,
}

/// The identity returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
    /// Full profile payload as returned by the provider.
    pub profile: Value,
}

impl Identity {
    /// Build an identity from a userinfo payload. The payload must carry a string `email`.
    pub fn from_profile(profile: Value) -> Result<Self, ProviderError> {
        let email = profile
            .get("email")
            .and_then(Value::as_str)
            .ok_or(ProviderError::MissingEmail)?
            .to_string();
        Ok(Self { email, profile })
    }
}

/// An OAuth 2.0 authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page URL the browser is sent to.
    fn authorization_url(&self, redirect_uri: &str) -> Url;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, ProviderError>;

    /// Fetch the identity belonging to an access token.
    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Google OAuth 2.0 provider.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, redirect_uri: &str) -> Url {
        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("client_id", &self.config.client_id)
            .append_pair("access_type", "offline")
            .append_pair("response_type", "code")
            .append_pair("prompt", "consent")
            .append_pair("scope", &SCOPES.join(" "));
        url
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.config.token_url.clone())
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint: "token",
                status: status.as_u16(),
            });
        }

        let tokens: TokenResponse = response.json().await?;
        tokens
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingAccessToken)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<Identity, ProviderError> {
        let response = self
            .client
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint: "userinfo",
                status: status.as_u16(),
            });
        }

        Identity::from_profile(response.json().await?)
    }
}
