//! Page routes.
//!
//! Reads are open to everyone; what they return depends on the caller and on
//! `?public`. Writes need a session.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_sessions::Session;

use super::helpers::{current_actor, json_body, parse_id, require_actor};
use crate::content::{View, ViewQuery, today};
use crate::error::AppResult;
use crate::models::{Page, PageDraft, PageSummary};
use crate::state::AppState;

/// GET /api/pages
async fn list_pages(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<PageSummary>>> {
    let actor = current_actor(&state, &session).await?;
    let view = View::resolve(actor.as_ref(), query.public_requested());

    let pages = state
        .queries()
        .list_pages(actor.as_ref(), view, today())
        .await?;
    Ok(Json(pages))
}

/// GET /api/pages/{id}
async fn get_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Page>> {
    let id = parse_id(&id)?;
    let actor = current_actor(&state, &session).await?;
    let view = View::resolve(actor.as_ref(), query.public_requested());

    let page = state
        .queries()
        .get_page(actor.as_ref(), view, id, today())
        .await?;
    Ok(Json(page))
}

/// POST /api/pages
async fn create_page(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<PageDraft>, JsonRejection>,
) -> AppResult<Json<Page>> {
    let actor = require_actor(&state, &session).await?;
    let draft = json_body(payload)?;

    let page = state.pages().create_page(&actor, &draft).await?;
    Ok(Json(page))
}

/// POST or PUT /api/pages/{id}
async fn update_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    payload: Result<Json<PageDraft>, JsonRejection>,
) -> AppResult<Json<Page>> {
    let actor = require_actor(&state, &session).await?;
    let id = parse_id(&id)?;
    let draft = json_body(payload)?;

    let page = state.pages().update_page(&actor, id, &draft).await?;
    Ok(Json(page))
}

/// DELETE /api/pages/{id}
async fn delete_page(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let actor = require_actor(&state, &session).await?;
    let id = parse_id(&id)?;

    state.pages().delete_page(&actor, id).await?;
    Ok(Json(serde_json::json!({})))
}

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages", get(list_pages).post(create_page))
        .route(
            "/pages/{id}",
            get(get_page)
                .post(update_page)
                .put(update_page)
                .delete(delete_page),
        )
}
