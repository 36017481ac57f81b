//! Login, logout, and the current session.

use super::{AppState, extract::{SESSION_COOKIE, Session}};
use crate::{
    core::user::{self as users, UserView},
    errors::Result,
};
use axum::{Json, extract::State, http::header, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email, matched case-insensitively
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Login response: the token plus the signed-in user
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed session token, also set as the `session` cookie
    pub token: String,
    /// The signed-in user with their company
    pub user: UserView,
}

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}");
    if secure { format!("{cookie}; Secure") } else { cookie }
}

/// POST /api/auth/login - Exchange email and password for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = users::authenticate(&state.db, &req.email, &req.password).await?;
    let token = state.auth.issue(&user)?;
    let cookie = session_cookie(
        &token,
        state.config.auth.token_ttl_hours * 3600,
        state.config.auth.secure_cookie,
    );
    let user = users::get_user_view(&state.db, user.id).await?;

    info!(user_id = user.user.id, role = ?user.user.role, "User logged in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { token, user }),
    ))
}

/// POST /api/auth/logout - Clear the session cookie
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, session_cookie("", 0, state.config.auth.secure_cookie))],
        Json(json!({ "success": true })),
    )
}

/// GET /api/auth/session - The signed-in user with their company
pub async fn session(State(state): State<AppState>, session: Session) -> Result<Json<UserView>> {
    Ok(Json(users::get_user_view(&state.db, session.user_id()).await?))
}
