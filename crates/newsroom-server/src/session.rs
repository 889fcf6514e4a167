// ABOUTME: Signed, client-held admin sessions carried in the `session` cookie.
// ABOUTME: Token = base64url(json) "." base64url(HMAC-SHA256); verified and expiry-checked on every read.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use http::HeaderMap;
use http::header::COOKIE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Errors that can occur while encoding or verifying a session token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,

    #[error("session signature does not match")]
    BadSignature,

    #[error("session expired")]
    Expired,

    #[error("invalid signing key")]
    InvalidKey,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The state held by an authenticated browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identity payload returned by the provider.
    pub user: Value,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl Session {
    /// An admin session for `user`, valid for 24 hours from `now`.
    pub fn admin(user: Value, now: DateTime<Utc>) -> Self {
        Self {
            user,
            is_admin: true,
            exp: (now + Duration::seconds(SESSION_MAX_AGE_SECS)).timestamp(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signs and verifies session tokens and renders the cookie headers that carry them.
#[derive(Clone)]
pub struct SessionCodec {
    key: Vec<u8>,
    secure: bool,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("key", &"<redacted>")
            .field("secure", &self.secure)
            .finish()
    }
}

impl SessionCodec {
    /// `secure` controls the cookie's Secure attribute; browsers only accept
    /// `SameSite=None` cookies when it is set.
    pub fn new(secret: impl AsRef<[u8]>, secure: bool) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            secure,
        }
    }

    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(session)?);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes())?.finalize().into_bytes());
        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify the signature first, then parse and check expiry against `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        self.mac(payload.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Malformed)?;
        let session: Session = serde_json::from_slice(&json)?;

        if session.is_expired_at(now) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    /// Read and verify the session cookie from request headers.
    /// Any failure reads as "no session".
    pub fn read_cookie(&self, headers: &HeaderMap) -> Option<Session> {
        let token = cookie_value(headers, SESSION_COOKIE)?;
        match self.decode(&token, Utc::now()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("ignoring session cookie: {}", e);
                None
            }
        }
    }

    /// `Set-Cookie` value establishing a session.
    pub fn set_cookie(&self, token: &str) -> String {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .max_age(CookieDuration::seconds(SESSION_MAX_AGE_SECS))
            .http_only(true)
            .same_site(SameSite::None)
            .secure(self.secure)
            .build()
            .to_string()
    }

    /// `Set-Cookie` value removing the session.
    pub fn clear_cookie(&self) -> String {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .max_age(CookieDuration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .http_only(true)
            .same_site(SameSite::None)
            .secure(self.secure)
            .build()
            .to_string()
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, SessionError> {
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| SessionError::InvalidKey)?;
        mac.update(data);
        Ok(mac)
    }
}

/// Find a cookie by name across all `Cookie` headers. Unparseable pairs are ignored.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value_trimmed().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn codec() -> SessionCodec {
        SessionCodec::new("test-secret", true)
    }

    fn session() -> Session {
        Session::admin(
            serde_json::json!({"email": "editor@example.com", "name": "Editor"}),
            Utc::now(),
        )
    }

    #[test]
    fn encode_decode_round_trip() {
        let codec = codec();
        let session = session();

        let token = codec.encode(&session).unwrap();
        let decoded = codec.decode(&token, Utc::now()).unwrap();

        assert_eq!(decoded, session);
        assert!(decoded.is_admin);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = session();
        forged.user = serde_json::json!({"email": "intruder@example.com"});
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let forged_token = format!("{}.{}", forged_payload, signature);

        assert!(matches!(
            codec.decode(&forged_token, Utc::now()),
            Err(SessionError::BadSignature)
        ));
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let token = SessionCodec::new("other-secret", true)
            .encode(&session())
            .unwrap();

        assert!(matches!(
            codec().decode(&token, Utc::now()),
            Err(SessionError::BadSignature)
        ));
    }

    #[test]
    fn expired_session_is_rejected() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();
        let later = Utc::now() + Duration::seconds(SESSION_MAX_AGE_SECS + 1);

        assert!(matches!(codec.decode(&token, later), Err(SessionError::Expired)));
    }

    #[test]
    fn garbage_tokens_are_malformed() {
        let codec = codec();
        assert!(matches!(codec.decode("no-dot", Utc::now()), Err(SessionError::Malformed)));
        assert!(matches!(codec.decode("a.!!!", Utc::now()), Err(SessionError::Malformed)));
    }

    #[test]
    fn read_cookie_finds_session_among_other_cookies() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session={}; lang=pt", token)).unwrap(),
        );

        let found = codec.read_cookie(&headers).expect("session should be read");
        assert_eq!(found.user["email"], "editor@example.com");
    }

    #[test]
    fn read_cookie_checks_every_cookie_header_and_skips_junk() {
        let codec = codec();
        let token = codec.encode(&session()).unwrap();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("junk; =novalue"));
        headers.append(
            COOKIE,
            HeaderValue::from_str(&format!("session=\"{}\"", token)).unwrap(),
        );

        let found = codec.read_cookie(&headers).expect("quoted session should be read");
        assert!(found.is_admin);
    }

    #[test]
    fn read_cookie_without_cookie_is_none() {
        assert!(codec().read_cookie(&HeaderMap::new()).is_none());
    }

    #[test]
    fn cookie_attributes_allow_cross_site_popup_flow() {
        let set = codec().set_cookie("tok");
        assert!(set.starts_with("session=tok;"));
        assert!(set.contains("Max-Age=86400"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("SameSite=None"));
        assert!(set.contains("Secure"));

        let insecure = SessionCodec::new("k", false).set_cookie("tok");
        assert!(!insecure.contains("Secure"));

        let cleared = codec().clear_cookie();
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }
}
