//! Session extractors.
//!
//! A session token is read from `Authorization: Bearer <token>` or, failing
//! that, from the `session` cookie. The user is reloaded from the database on
//! every request so role and company changes take effect immediately.

use super::AppState;
use crate::{
    core::user as users,
    entities::{Role, user},
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    /// The user as currently stored
    pub user: user::Model,
}

impl Session {
    /// Id of the signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user.id
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or(Error::Unauthorized)?;
        let claims = state.auth.verify(&token)?;
        let user = users::get_user(&state.db, claims.user_id()?)
            .await
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::Unauthorized,
                other => other,
            })?;
        Ok(Self { user })
    }
}

/// A signed-in admin. Vendors are rejected with 401 like anonymous callers.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.user.role != Role::Admin {
            return Err(Error::Unauthorized);
        }
        Ok(Self(session))
    }
}
