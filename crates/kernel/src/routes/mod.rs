//! HTTP route handlers.

pub mod games;
pub mod health;
pub mod ladder;
pub mod ranking;

use axum::Router;

use crate::state::AppState;

/// Build the application router with all routes and shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(games::router())
        .merge(ranking::router())
        .merge(ladder::router())
        .with_state(state)
}
