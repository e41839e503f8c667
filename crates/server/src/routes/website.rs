//! Website name routes.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use tower_sessions::Session;

use super::helpers::require_actor;
use crate::error::AppResult;
use crate::models::Website;
use crate::state::AppState;

/// GET /api/websites
async fn get_website(State(state): State<AppState>) -> AppResult<Json<Website>> {
    Ok(Json(state.website().get().await?))
}

/// PUT /api/websites/{name}
async fn rename_website(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> AppResult<Json<Website>> {
    let actor = require_actor(&state, &session).await?;
    Ok(Json(state.website().set(&actor, &name).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/websites", get(get_website))
        .route("/websites/{name}", put(rename_website))
}
