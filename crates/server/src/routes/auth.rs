//! Session routes (login, current user, logout).

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info};

use super::helpers::{SESSION_USER_ID, current_user, json_body};
use crate::content::credentials::verify_credentials;
use crate::error::{AppError, AppResult, FieldError};
use crate::models::User;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

/// Session setup failures are infrastructure problems, not bad credentials.
fn session_failure(e: tower_sessions::session::Error) -> AppError {
    AppError::Unavailable(anyhow::Error::new(e).context("session store failure"))
}

/// POST /api/sessions
async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<User>> {
    let request = json_body(payload)?;

    let mut errors = Vec::new();
    if request.username.trim().is_empty() {
        errors.push(FieldError::new("username", "must not be empty"));
    }
    if request.password.is_empty() {
        errors.push(FieldError::new("password", "must not be empty"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(user) =
        verify_credentials(state.storage(), &request.username, &request.password).await?
    else {
        debug!("login rejected");
        return Err(AppError::InvalidCredentials);
    };

    // New id on privilege change.
    session.cycle_id().await.map_err(session_failure)?;
    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(session_failure)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(user))
}

/// GET /api/sessions/current
async fn current(State(state): State<AppState>, session: Session) -> AppResult<Json<User>> {
    current_user(&state, &session)
        .await?
        .map(Json)
        .ok_or(AppError::Unauthenticated)
}

/// DELETE /api/sessions/current
async fn logout(session: Session) -> AppResult<Json<serde_json::Value>> {
    let user_id: Option<i64> = session.get(SESSION_USER_ID).await.ok().flatten();

    session.delete().await.map_err(session_failure)?;

    if let Some(user_id) = user_id {
        info!(user_id, "user logged out");
    }
    Ok(Json(serde_json::json!({})))
}

/// Create the session router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(login))
        .route("/sessions/current", get(current).delete(logout))
}
