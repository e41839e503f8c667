//! Shared route helpers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use tower_sessions::Session;

use crate::content::Actor;
use crate::content::credentials::get_user_by_id;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::state::AppState;

/// Session key for storing the authenticated user ID.
pub const SESSION_USER_ID: &str = "user_id";

/// Load the logged-in user, if any.
///
/// A session pointing at a user that no longer exists counts as anonymous.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<User>> {
    let user_id: Option<i64> = session.get(SESSION_USER_ID).await.ok().flatten();

    match user_id {
        Some(id) => get_user_by_id(state.storage(), id).await,
        None => Ok(None),
    }
}

/// Actor for the logged-in user, if any.
pub async fn current_actor(state: &AppState, session: &Session) -> AppResult<Option<Actor>> {
    Ok(current_user(state, session).await?.as_ref().map(Actor::from))
}

/// Require an authenticated caller.
pub async fn require_actor(state: &AppState, session: &Session) -> AppResult<Actor> {
    current_actor(state, session)
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// Parse a numeric path id.
pub fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::invalid("id", "must be a positive integer"))
}

/// Unwrap a JSON body, reporting malformed input as a validation error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid("body", rejection.body_text()))
}
