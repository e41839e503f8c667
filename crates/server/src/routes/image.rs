//! Image library routes: the name listing and the files themselves.

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::fs;
use tracing::warn;

use crate::content::images::mime_from_path;
use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/images
async fn list_images(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.queries().list_images().await?))
}

/// GET /images/{name}
async fn serve_image(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(path) = state.images().resolve(&name).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match fs::read(&path).await {
        Ok(content) => (
            [
                (header::CONTENT_TYPE, mime_from_path(&path)),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            content,
        )
            .into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read image");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// JSON listing, mounted under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/images", get(list_images))
}

/// Image files, mounted at the root.
pub fn files_router() -> Router<AppState> {
    Router::new().route("/images/{name}", get(serve_image))
}
