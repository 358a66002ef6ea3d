//! Read-only peek into JWT access tokens.
//!
//! The client never verifies signatures, it only reads `exp` and `sub` to
//! report how long a session has left.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
}

pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = peek_claims(token)?.exp?;
    Utc.timestamp_opt(exp, 0).single()
}
