//! Pre-launch password gate
//!
//! While a password is configured, API requests need a `site_access` cookie
//! carrying the access token, the hex SHA-256 digest of the password.
//! `POST /api/unlock` with the right password sets the cookie. The health
//! check and the unlock route itself stay open.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use super::error::ApiError;
use super::state::AppState;

pub const ACCESS_COOKIE: &str = "site_access";

/// Cookie lifetime: 30 days
const ACCESS_COOKIE_MAX_AGE: u64 = 30 * 24 * 60 * 60;

/// Paths reachable without the access cookie
const OPEN_PATHS: &[&str] = &["/api/health", "/api/unlock"];

/// Gate settings held in router state
#[derive(Debug, Clone, Default)]
pub struct Gate {
    token: Option<Arc<str>>,
}

impl Gate {
    /// Creates a gate; `None` disables it
    pub fn new(password: Option<String>) -> Self {
        Self {
            token: password
                .filter(|p| !p.is_empty())
                .map(|p| Arc::from(access_token(&p))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Returns true if `password` unlocks the gate (always true when disabled)
    pub fn check_password(&self, password: &str) -> bool {
        self.token.as_deref().map_or(true, |token| {
            constant_time_eq(token.as_bytes(), access_token(password).as_bytes())
        })
    }

    /// Returns true if the request may pass
    pub fn admits(&self, path: &str, headers: &HeaderMap) -> bool {
        let Some(token) = self.token.as_deref() else {
            return true;
        };
        OPEN_PATHS.contains(&path)
            || cookie_value(headers, ACCESS_COOKIE)
                .is_some_and(|value| constant_time_eq(value, token.as_bytes()))
    }

    /// `Set-Cookie` value granting access, if the gate is enabled
    pub fn access_cookie(&self) -> Option<String> {
        self.token.as_deref().map(|token| {
            format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                ACCESS_COOKIE, token, ACCESS_COOKIE_MAX_AGE
            )
        })
    }
}

/// Cookie value for a password: lowercase hex SHA-256, always cookie-safe
pub fn access_token(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compares byte strings without short-circuiting on the first difference
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Finds a cookie by name across all `Cookie` headers
///
/// Works on raw bytes so one non-ASCII cookie does not hide the others.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a [u8]> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|b| *b == b';'))
        .filter_map(|pair| {
            let pair = pair.trim_ascii();
            let split = pair.iter().position(|b| *b == b'=')?;
            Some((&pair[..split], &pair[split + 1..]))
        })
        .find(|(key, _)| *key == name.as_bytes())
        .map(|(_, value)| value)
}

/// Middleware rejecting requests that have not passed the gate
pub async fn require_access(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.gate.admits(request.uri().path(), request.headers()) {
        return Ok(next.run(request).await);
    }
    tracing::debug!(path = %request.uri().path(), "request blocked by gate");
    Err(ApiError::Locked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_disabled_gate_admits_everything() {
        let gate = Gate::new(None);
        assert!(!gate.is_enabled());
        assert!(gate.admits("/api/earthquakes", &HeaderMap::new()));
        assert!(gate.check_password("anything"));
        assert!(gate.access_cookie().is_none());
    }

    #[test]
    fn test_empty_password_disables_gate() {
        assert!(!Gate::new(Some(String::new())).is_enabled());
    }

    #[test]
    fn test_enabled_gate_requires_cookie() {
        let gate = Gate::new(Some("aurora".to_string()));
        let cookie = format!("theme=dark; site_access={}", access_token("aurora"));

        assert!(!gate.admits("/api/earthquakes", &HeaderMap::new()));
        assert!(!gate.admits("/api/earthquakes", &headers_with_cookie("site_access=wrong")));
        // The raw password is not the token
        assert!(!gate.admits("/api/earthquakes", &headers_with_cookie("site_access=aurora")));
        assert!(gate.admits("/api/earthquakes", &headers_with_cookie(&cookie)));
    }

    #[test]
    fn test_access_token_is_cookie_safe() {
        for password in ["aurora", "open;sesame", "two words", "a,b=c", "pässwort"] {
            let token = access_token(password);
            assert_eq!(token.len(), 64);
            assert!(token.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        }
        assert_ne!(access_token("open;sesame"), access_token("open"));
    }

    #[test]
    fn test_password_with_separators_round_trips() {
        let gate = Gate::new(Some("open;sesame".to_string()));
        assert!(gate.check_password("open;sesame"));
        assert!(!gate.check_password("open"));

        let cookie = gate.access_cookie().unwrap();
        let pair = cookie.split(';').next().unwrap();
        assert!(gate.admits("/api/lightning", &headers_with_cookie(pair)));
    }

    #[test]
    fn test_non_ascii_cookie_does_not_hide_access_cookie() {
        let gate = Gate::new(Some("aurora".to_string()));
        let raw = format!("theme=bl\u{e5}; site_access={}", access_token("aurora"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_bytes(raw.as_bytes()).unwrap(),
        );
        assert!(gate.admits("/api/earthquakes", &headers));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token2"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_open_paths_bypass_gate() {
        let gate = Gate::new(Some("aurora".to_string()));
        assert!(gate.admits("/api/health", &HeaderMap::new()));
        assert!(gate.admits("/api/unlock", &HeaderMap::new()));
    }

    #[test]
    fn test_password_check_and_cookie() {
        let gate = Gate::new(Some("aurora".to_string()));
        assert!(gate.check_password("aurora"));
        assert!(!gate.check_password("borealis"));

        let cookie = gate.access_cookie().unwrap();
        assert!(cookie.starts_with(&format!("site_access={};", access_token("aurora"))));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[test]
    fn test_cookie_value_parsing() {
        let headers = headers_with_cookie("a=1;  b=2 ;c=3");
        assert_eq!(cookie_value(&headers, "a"), Some(&b"1"[..]));
        assert_eq!(cookie_value(&headers, "b"), Some(&b"2"[..]));
        assert_eq!(cookie_value(&headers, "c"), Some(&b"3"[..]));
        assert_eq!(cookie_value(&headers, "d"), None);
    }
}
