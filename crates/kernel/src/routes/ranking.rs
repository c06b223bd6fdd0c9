//! Leaderboard routes.
//!
//! `GET /players` and `GET /heroes` share one handler shape and differ only
//! in the grouping entity and the envelope key.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::query::RawListParams;
use crate::ranking::RankingRow;
use crate::state::AppState;

#[derive(Serialize)]
struct PlayersResponse {
    players: Vec<RankingRow>,
    count: u64,
}

#[derive(Serialize)]
struct HeroesResponse {
    heroes: Vec<RankingRow>,
    count: u64,
}

/// Create the leaderboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/players", get(rank_players))
        .route("/heroes", get(rank_heroes))
}

async fn rank_players(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<PlayersResponse>> {
    let request = RawListParams::from_pairs(pairs).into_request(state.max_page_size());
    let page = state.stats().rank_players(&request).await?;

    Ok(Json(PlayersResponse {
        players: page.rows,
        count: page.total_count,
    }))
}

async fn rank_heroes(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<HeroesResponse>> {
    let request = RawListParams::from_pairs(pairs).into_request(state.max_page_size());
    let page = state.stats().rank_heroes(&request).await?;

    Ok(Json(HeroesResponse {
        heroes: page.rows,
        count: page.total_count,
    }))
}
