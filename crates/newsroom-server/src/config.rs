// ABOUTME: Configuration loading and validation for the newsroom server.
// ABOUTME: Reads environment variables (optionally from .env) and enforces session-signing constraints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use newsroom_store::ShareRetention;
use thiserror::Error;
use url::Url;

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NEWSROOM_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("NEWSROOM_SHARE_RETENTION must be 'prune' or 'keep', got '{0}'")]
    InvalidRetention(String),

    #[error("NEWSROOM_OAUTH_TIMEOUT_SECS is not a positive integer: {0}")]
    InvalidTimeout(String),

    #[error("SESSION_SECRET is not set; refusing to sign admin sessions without a key")]
    MissingSessionSecret,
}

/// Google OAuth client settings and endpoints.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
    pub timeout: Duration,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct NewsroomConfig {
    pub bind: SocketAddr,
    pub app_url: Url,
    pub data_file: PathBuf,
    pub public_dir: PathBuf,
    pub share_retention: ShareRetention,
    pub session_secret: Option<String>,
    pub cookie_secure: bool,
    pub authorized_emails: Vec<String>,
    pub google: GoogleConfig,
}

impl NewsroomConfig {
    /// Load configuration from process environment variables.
    ///
    /// Environment variables:
    /// - APP_URL: public base URL (default: http://localhost:3000)
    /// - GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET: OAuth client credentials
    /// - SESSION_SECRET: key for signing session cookies (required to serve)
    /// - AUTHORIZED_EMAILS: comma-separated admin allow-list
    /// - NEWSROOM_BIND: socket address to bind (default: 0.0.0.0:3000)
    /// - NEWSROOM_DATA_FILE: news document (default: data/news.json)
    /// - NEWSROOM_PUBLIC_DIR: static root, share pages live in its share/ (default: public)
    /// - NEWSROOM_SHARE_RETENTION: prune | keep (default: prune)
    /// - NEWSROOM_COOKIE_SECURE: set the Secure cookie attribute (default: true)
    /// - GOOGLE_AUTH_URL / GOOGLE_TOKEN_URL / GOOGLE_USERINFO_URL: endpoint overrides
    /// - NEWSROOM_OAUTH_TIMEOUT_SECS: provider request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_str = var("NEWSROOM_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let app_url = parse_url(
            "APP_URL",
            var("APP_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
        )?;

        let data_file = var("NEWSROOM_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data").join("news.json"));

        let public_dir = var("NEWSROOM_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("public"));

        let share_retention = match var("NEWSROOM_SHARE_RETENTION") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidRetention)?,
            None => ShareRetention::default(),
        };

        let session_secret = var("SESSION_SECRET");

        let cookie_secure = var("NEWSROOM_COOKIE_SECURE")
            .map(|v| !matches!(v.trim(), "false" | "0" | "no"))
            .unwrap_or(true);

        let authorized_emails = parse_allow_list(&var("AUTHORIZED_EMAILS").unwrap_or_default());

        let timeout = match var("NEWSROOM_OAUTH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(10),
        };

        let google = GoogleConfig {
            client_id: var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            auth_url: parse_url(
                "GOOGLE_AUTH_URL",
                var("GOOGLE_AUTH_URL").unwrap_or_else(|| DEFAULT_GOOGLE_AUTH_URL.to_string()),
            )?,
            token_url: parse_url(
                "GOOGLE_TOKEN_URL",
                var("GOOGLE_TOKEN_URL").unwrap_or_else(|| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
            )?,
            userinfo_url: parse_url(
                "GOOGLE_USERINFO_URL",
                var("GOOGLE_USERINFO_URL")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_USERINFO_URL.to_string()),
            )?,
            timeout,
        };

        Ok(Self {
            bind,
            app_url,
            data_file,
            public_dir,
            share_retention,
            session_secret,
            cookie_secure,
            authorized_emails,
            google,
        })
    }

    /// The session signing key. Serving without one is refused.
    pub fn require_session_secret(&self) -> Result<&str, ConfigError> {
        self.session_secret
            .as_deref()
            .ok_or(ConfigError::MissingSessionSecret)
    }

    /// Directory that receives the generated share pages.
    pub fn share_dir(&self) -> PathBuf {
        self.public_dir.join("share")
    }

    /// OAuth redirect URI registered with the provider.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/api/auth/callback",
            self.app_url.as_str().trim_end_matches('/')
        )
    }

    /// Origin the login popup reports success to.
    pub fn app_origin(&self) -> String {
        self.app_url.origin().ascii_serialization()
    }
}

/// Split a comma-separated allow-list into trimmed, lowercased, non-empty emails.
pub fn parse_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|_| ConfigError::InvalidUrl { var, value })
}
