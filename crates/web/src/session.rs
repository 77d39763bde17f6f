//! Stateless session tokens.
//!
//! Sessions are HS256-signed JWTs carried in the http-only `tripQuestToken`
//! cookie. The claims are the user id (`sub`) and expiry (`exp`) only;
//! handlers re-fetch the user record on every request, so the cookie never
//! carries account data and there is no server-side session store. A token
//! stays valid until its expiry; logout discards the cookie but cannot
//! revoke the token.
//!
//! The deferred search cookie (`query`) also lives here: when a visitor
//! searches before logging in, the pending query is kept in a second
//! http-only cookie and replayed right after login.

use axum_extra::extract::cookie::Cookie;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tripquest_core::UserId;

use crate::models::search::SearchQuery;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "tripQuestToken";

/// Cookie holding a search query deferred until after login.
pub const QUERY_COOKIE: &str = "query";

/// Session lifetime in minutes.
pub const SESSION_TTL_MINUTES: i64 = 30;

/// Errors that can occur while handling session or deferred-query cookies.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is malformed, carries a bad signature, or has expired.
    /// Callers treat all three the same way.
    #[error("invalid session token")]
    Invalid,

    /// Signing a fresh token failed.
    #[error("token signing failed")]
    Signing,

    /// The deferred query could not be serialized into a cookie value.
    #[error("query cookie encoding failed")]
    QueryEncoding,
}

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id the session belongs to.
    sub: i32,
    /// Expiry as a Unix timestamp.
    exp: i64,
}

/// Issues and verifies session tokens.
///
/// Cheap to clone; holds only the derived signing keys and the configured
/// token lifetime.
#[derive(Clone)]
pub struct Sessions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Sessions {
    /// Build a token issuer from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Sign a session token for `user_id`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Signing`] if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, SessionError> {
        let claims = Claims {
            sub: user_id.as_i32(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| SessionError::Signing)
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// Expiry is checked with zero leeway: a token is good for exactly its
    /// lifetime and not a second longer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] for bad signatures, malformed
    /// tokens, and expired tokens alike.
    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| SessionError::Invalid)?;

        Ok(UserId::new(data.claims.sub))
    }
}

// =============================================================================
// Cookie Builders
// =============================================================================

/// Build the http-only session cookie carrying `token`.
///
/// No `Max-Age` is set: the cookie lives for the browser session while the
/// token's own `exp` claim enforces the 30-minute limit.
#[must_use]
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

/// Cookie that clears the session on the client.
#[must_use]
pub fn session_removal() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Encode a search query into the deferred `query` cookie.
///
/// The query is serialized to JSON and base64-encoded so the cookie value
/// stays free of reserved characters.
///
/// # Errors
///
/// Returns [`SessionError::QueryEncoding`] if serialization fails.
pub fn deferred_query_cookie(query: &SearchQuery) -> Result<Cookie<'static>, SessionError> {
    let json = serde_json::to_vec(query).map_err(|_| SessionError::QueryEncoding)?;

    let mut cookie = Cookie::new(QUERY_COOKIE, URL_SAFE_NO_PAD.encode(json));
    cookie.set_http_only(true);
    cookie.set_path("/");
    Ok(cookie)
}

/// Cookie that clears the deferred query on the client.
#[must_use]
pub fn query_removal() -> Cookie<'static> {
    let mut cookie = Cookie::new(QUERY_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Decode a deferred query cookie value.
///
/// Invalid payloads yield `None` and the search falls back to URL
/// parameters.
#[must_use]
pub fn parse_deferred_query(value: &str) -> Option<SearchQuery> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_secret() -> SecretString {
        SecretString::from("kT9#mW2$xQ7!pL4@nR8&vB3*zD6^hJ1%")
    }

    fn sessions_with_ttl(ttl: Duration) -> Sessions {
        Sessions::new(&test_secret(), ttl)
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let sessions = sessions_with_ttl(Duration::minutes(SESSION_TTL_MINUTES));
        let token = sessions.issue(UserId::new(42)).unwrap();

        let user_id = sessions.verify(&token).unwrap();
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let sessions = sessions_with_ttl(Duration::minutes(-1));
        let token = sessions.issue(UserId::new(42)).unwrap();

        let result = sessions.verify(&token);
        assert!(matches!(result, Err(SessionError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let sessions = sessions_with_ttl(Duration::minutes(SESSION_TTL_MINUTES));
        let token = sessions.issue(UserId::new(7)).unwrap();

        let other = Sessions::new(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            Duration::minutes(SESSION_TTL_MINUTES),
        );
        assert!(matches!(other.verify(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let sessions = sessions_with_ttl(Duration::minutes(SESSION_TTL_MINUTES));
        let token = sessions.issue(UserId::new(7)).unwrap();

        let mut tampered = token;
        tampered.push('x');
        assert!(matches!(
            sessions.verify(&tampered),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let sessions = sessions_with_ttl(Duration::minutes(SESSION_TTL_MINUTES));
        assert!(matches!(
            sessions.verify("not-a-token"),
            Err(SessionError::Invalid)
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        // Browser-session cookie: expiry is carried by the token itself
        assert!(cookie.max_age().is_none());
    }

    #[test]
    fn test_session_removal_expires_cookie() {
        let cookie = session_removal();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert!(cookie.value().is_empty());
        assert!(cookie.max_age().is_some());
    }

    #[test]
    fn test_deferred_query_roundtrip() {
        let query = SearchQuery {
            origin: "LOS".to_string(),
            destination: "LHR".to_string(),
            date: "2025-09-01".to_string(),
            travelers: "2".to_string(),
        };

        let cookie = deferred_query_cookie(&query).unwrap();
        assert_eq!(cookie.name(), QUERY_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));

        let parsed = parse_deferred_query(cookie.value()).unwrap();
        assert_eq!(parsed, query);
    }

    #[test]
    fn test_deferred_query_value_is_cookie_safe() {
        let query = SearchQuery {
            origin: "LOS".to_string(),
            destination: "LHR".to_string(),
            date: "2025-09-01".to_string(),
            travelers: "2".to_string(),
        };

        let cookie = deferred_query_cookie(&query).unwrap();
        // No characters that would need quoting in a Set-Cookie header
        assert!(
            cookie
                .value()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_parse_deferred_query_rejects_bad_base64() {
        assert!(parse_deferred_query("!!!not base64!!!").is_none());
    }

    #[test]
    fn test_parse_deferred_query_rejects_bad_json() {
        let value = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(parse_deferred_query(&value).is_none());
    }
}
