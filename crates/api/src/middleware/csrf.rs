//! Double-submit CSRF check.
//!
//! The login flow sets a CSRF cookie. Mutating requests must echo the same
//! value in the `x-csrf-token` header.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use vowpage_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// Marker extractor: present only when the header and cookie match.
#[derive(Debug, Clone, Copy)]
pub struct CsrfVerified;

impl FromRequestParts<AppState> for CsrfVerified {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        let cookie = cookie_value(&parts.headers, &state.config.csrf_cookie_name);

        match (header, cookie) {
            (Some(h), Some(c)) if constant_time_eq(h.as_bytes(), c.as_bytes()) => {
                Ok(CsrfVerified)
            }
            _ => {
                tracing::warn!(path = %parts.uri.path(), "CSRF token mismatch");
                Err(AppError::Core(CoreError::Forbidden(
                    "CSRF token missing or invalid".into(),
                )))
            }
        }
    }
}

/// Find `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
