//! Ladder listing route.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::LadderSummary;
use crate::state::AppState;

#[derive(Serialize)]
struct LaddersResponse {
    ladders: Vec<LadderSummary>,
}

/// Create the ladder router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ladders", get(list_ladders))
}

async fn list_ladders(State(state): State<AppState>) -> AppResult<Json<LaddersResponse>> {
    let ladders = state.stats().ladders().await?;
    Ok(Json(LaddersResponse { ladders }))
}
