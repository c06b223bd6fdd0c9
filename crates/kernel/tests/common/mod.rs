#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Fixtures from `matchstats-test-utils` are converted into kernel models
//! and served from a `MemoryStore` through the REAL routes and service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use matchstats_kernel::AppState;
use matchstats_kernel::models::{Game, GamePlayer, Hero, Item, Player};
use matchstats_kernel::routes;
use matchstats_kernel::service::StatsService;
use matchstats_kernel::store::MemoryStore;
use matchstats_test_utils::{TestGame, record};

pub const MAX_PAGE_SIZE: u64 = 100;

/// A mixed population: several players, heroes, modes and ladders.
pub fn league() -> Vec<TestGame> {
    let mut games = Vec::new();
    let mut id = 1;
    for (steam_id, wins, losses) in [(1, 6, 1), (2, 3, 3), (3, 1, 5), (4, 4, 0), (5, 0, 2)] {
        for game in record(id, steam_id, if steam_id % 2 == 0 { "Sasuke" } else { "Naruto" }, wins, losses) {
            let game = if game.id % 3 == 0 {
                game.with_mode("POINT_30").in_ladder("weekly")
            } else {
                game
            };
            games.push(game);
        }
        id += i64::from(wins + losses);
    }
    games
}

/// Convert a fixture into a kernel game. Participations inherit the game's
/// date, mode, ladders and rankeable flag.
pub fn to_game(fixture: &TestGame) -> Game {
    let game_mode = fixture.game_mode.parse().expect("fixture game mode");
    let players = fixture
        .players
        .iter()
        .enumerate()
        .map(|(slot, p)| GamePlayer {
            id: fixture.id * 100 + slot as i64,
            created_date: fixture.created_date,
            state: p.state.clone(),
            player: Player {
                steam_id: p.steam_id,
                name: p.player_name.clone(),
            },
            hero: Hero {
                name: p.hero_name.clone(),
            },
            kills: p.kills,
            deaths: p.deaths,
            assists: p.assists,
            points: p.points,
            level: p.level,
            team: p.team.clone(),
            winner: p.winner,
            rankeable: fixture.rankeable,
            items: p.items.iter().map(|name| Item { name: name.clone() }).collect(),
            game_mode,
            hero_selection_mode: fixture.hero_selection_mode.clone(),
            ladder_names: fixture.ladder_names.clone(),
        })
        .collect();

    Game {
        id: fixture.id,
        created_date: fixture.created_date,
        game_mode,
        hero_selection_mode: fixture.hero_selection_mode.clone(),
        duration_seconds: fixture.duration_seconds,
        winner_team: fixture.winner_team.clone(),
        rankeable: fixture.rankeable,
        balance: fixture.balance.clone(),
        ladder_names: fixture.ladder_names.clone(),
        players,
    }
}

pub fn memory_store(fixtures: &[TestGame]) -> MemoryStore {
    MemoryStore::new(fixtures.iter().map(to_game).collect())
}

pub fn service(fixtures: &[TestGame]) -> StatsService {
    StatsService::new(Arc::new(memory_store(fixtures)), Duration::from_secs(5))
}

/// Test application wrapper using the REAL kernel routes over a memory store.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(fixtures: &[TestGame]) -> Self {
        let state = AppState::with_store(
            Arc::new(memory_store(fixtures)),
            Duration::from_secs(5),
            MAX_PAGE_SIZE,
        );
        Self {
            router: routes::app(state),
        }
    }

    /// GET `path` with the given query parameters, URL-encoded.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> (StatusCode, Value) {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        let uri = if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", query.join("&"))
        };

        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
