//! HTTP JSON API over the practice services.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use services::error::ProgressServiceError;

use crate::state::AppState;

mod completions;
mod questions;
mod users;

pub type AppStateArc = Arc<AppState>;

/// All API routes, still awaiting their state.
pub fn api_router() -> Router<AppStateArc> {
    Router::new()
        .merge(questions::routes())
        .merge(completions::routes())
        .merge(users::routes())
}

/// The fully assembled application.
pub fn app(state: AppStateArc) -> Router {
    api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub(crate) fn service_error(err: ProgressServiceError) -> (StatusCode, String) {
    match err {
        ProgressServiceError::UnknownUser(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ProgressServiceError::Score(_) | ProgressServiceError::Session(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
