//! User listing for author assignment.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;

use super::helpers::require_actor;
use crate::error::AppResult;
use crate::models::UserSummary;
use crate::state::AppState;

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<UserSummary>>> {
    let actor = require_actor(&state, &session).await?;
    Ok(Json(state.queries().list_users(&actor).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}
