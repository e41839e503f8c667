//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod helpers;
pub mod image;
pub mod page;
pub mod user;
pub mod website;

use axum::Router;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Assemble every route with its session layer.
///
/// The JSON API lives under `/api`; image files and the health check sit at
/// the root. Outer layers (tracing, CORS) are added by the caller.
pub fn build_router<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let api = Router::new()
        .merge(auth::router())
        .merge(user::router())
        .merge(page::router())
        .merge(image::api_router())
        .merge(website::router());

    Router::new()
        .nest("/api", api)
        .merge(image::files_router())
        .merge(health::router())
        .layer(session_layer)
        .with_state(state)
}
