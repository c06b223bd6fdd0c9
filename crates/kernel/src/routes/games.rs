//! Game list route.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::Game;
use crate::query::RawListParams;
use crate::state::AppState;

#[derive(Serialize)]
struct GamesResponse {
    games: Vec<Game>,
    count: u64,
}

/// Create the game list router.
pub fn router() -> Router<AppState> {
    Router::new().route("/games", get(list_games))
}

async fn list_games(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<GamesResponse>> {
    let request = RawListParams::from_pairs(pairs).into_request(state.max_page_size());
    let page = state.stats().list_games(&request).await?;

    Ok(Json(GamesResponse {
        games: page.rows,
        count: page.total_count,
    }))
}
