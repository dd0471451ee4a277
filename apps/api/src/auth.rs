//! Session lookup for API routes.
//!
//! Sign-in itself is handled by the external auth service, which writes rows
//! into `evergreeners.sessions`. Here we only resolve a session token to the
//! user it belongs to.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

const SESSION_COOKIES: [&str; 2] = [
    "better-auth.session_token",
    "__Secure-better-auth.session_token",
];

/// The authenticated caller's user id.
///
/// Rejects with 401 when no token is presented or the session is unknown or
/// expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(AppError::Unauthorized)?;

        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM evergreeners.sessions WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(&token)
        .fetch_optional(&state.db)
        .await?;

        match user_id {
            Some(id) => Ok(AuthUser(id)),
            None => {
                debug!("Rejected unknown or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// Bearer token first, then the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    if let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| SESSION_COOKIES.contains(name))
        .and_then(|(_, value)| cookie_token(value))
}

/// Cookie values are `<token>.<signature>`, possibly percent-encoded.
fn cookie_token(value: &str) -> Option<String> {
    let value = value.replace("%2E", ".").replace("%2e", ".");
    let token = value.split('.').next()?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
