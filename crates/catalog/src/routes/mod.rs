//! HTTP route handlers.

pub mod health;
pub mod helpers;
pub mod projects;
pub mod survey_missions;
pub mod survey_related_records;
pub mod vocabularies;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::negotiate_language;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(projects::router())
        .merge(survey_missions::router())
        .merge(survey_related_records::router())
        .merge(vocabularies::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            negotiate_language,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
