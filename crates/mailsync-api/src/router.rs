//! Top-level router

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{health, lists, members};

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(lists::router())
        .merge(members::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
