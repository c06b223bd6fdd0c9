#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP route tests.
//!
//! Requests go through the real router, state and service over a memory store.

mod common;

use axum::http::StatusCode;
use matchstats_test_utils::{TestGame, assert, record, test_game, test_participation};

use common::TestApp;

fn fixtures() -> Vec<TestGame> {
    let mut games = record(1, 1, "Naruto", 5, 1);
    games.extend(record(10, 2, "Sasuke", 1, 4));
    games.push(
        test_game(20)
            .with_mode("NORMAL")
            .in_ladder("weekly")
            .with_balance("v2.1")
            .with_player(test_participation(3, "Gaara").won().with_item("Kunai"))
            .with_player(test_participation(1, "Naruto").lost()),
    );
    games
}

#[tokio::test]
async fn games_envelope_and_default_order() {
    let app = TestApp::new(&fixtures());
    let (status, body) = app.get("/games", &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert::array_len(&body, "games", 10);
    assert::count(&body, 12);

    // Newest first.
    assert_eq!(body["games"][0]["id"], 20);
    assert_eq!(body["games"][0]["gameMode"], "NORMAL");
    assert_eq!(body["games"][0]["players"][0]["items"][0]["name"], "Kunai");
    assert_eq!(body["games"][0]["players"][0]["player"]["steamId"], 3);
}

#[tokio::test]
async fn games_filters_and_pagination() {
    let app = TestApp::new(&fixtures());
    let (status, body) = app
        .get(
            "/games",
            &[
                ("filters", r#"[{"id":"gameMode","value":"point 45"}]"#),
                ("take", "4"),
                ("skip", "8"),
            ],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert::count(&body, 11);
    assert::array_len(&body, "games", 3);
}

#[tokio::test]
async fn games_ignore_search() {
    let app = TestApp::new(&fixtures());
    let (_, body) = app.get("/games", &[("search", "zzz")]).await;
    assert::count(&body, 12);
}

#[tokio::test]
async fn players_are_ranked_by_score() {
    let app = TestApp::new(&fixtures());
    let (status, body) = app.get("/players", &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert::count(&body, 3);
    let first = &body["players"][0];
    assert_eq!(first["steamId"], 1);
    assert_eq!(first["name"], "player1");
    assert_eq!(first["wins"], 5);
    assert_eq!(first["losses"], 2);
    assert_eq!(first["games"], 7);
    assert_eq!(first["heroes"], 1);
    assert::has_key(first, "score");
    assert::has_key(first, "kills");
}

#[tokio::test]
async fn players_sorting_and_search() {
    let app = TestApp::new(&fixtures());
    let (_, body) = app
        .get("/players", &[("sorting", r#"[{"id":"losses","desc":true}]"#)])
        .await;
    assert_eq!(body["players"][0]["steamId"], 2);

    let (_, body) = app.get("/players", &[("search", "player3")]).await;
    assert::count(&body, 1);
    assert_eq!(body["players"][0]["steamId"], 3);
}

#[tokio::test]
async fn players_ladder_filter_and_sentinel() {
    let app = TestApp::new(&fixtures());

    let (_, weekly) = app
        .get("/players", &[("filters", r#"[{"id":"ladder","value":"WEEKLY"}]"#)])
        .await;
    assert::count(&weekly, 2);

    let (_, public) = app
        .get("/players", &[("filters", r#"[{"id":"ladder","value":"public"}]"#)])
        .await;
    let (_, unfiltered) = app.get("/players", &[]).await;
    assert_eq!(public, unfiltered);
}

#[tokio::test]
async fn heroes_envelope() {
    let app = TestApp::new(&fixtures());
    let (status, body) = app.get("/heroes", &[("take", "2")]).await;

    assert_eq!(status, StatusCode::OK);
    assert::count(&body, 3);
    assert::array_len(&body, "heroes", 2);
    assert::has_key(&body["heroes"][0], "heroName");
    assert!(body["heroes"][0].get("heroes").is_none());
}

#[tokio::test]
async fn malformed_parameters_never_fail() {
    let app = TestApp::new(&fixtures());
    for path in ["/games", "/players", "/heroes"] {
        let (status, body) = app
            .get(
                path,
                &[
                    ("filters", "{oops"),
                    ("sorting", "42"),
                    ("take", "lots"),
                    ("skip", "-3"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert::has_key(&body, "count");
    }
}

#[tokio::test]
async fn repeated_parameters_keep_the_first_value() {
    let app = TestApp::new(&fixtures());
    let (status, body) = app
        .get(
            "/games",
            &[
                ("take", "5"),
                ("take", "7"),
                ("filters", "[]"),
                ("filters", r#"[{"id":"gameMode","value":"normal"}]"#),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert::count(&body, 12);
    assert::array_len(&body, "games", 5);

    for path in ["/players", "/heroes"] {
        let (status, body) = app
            .get(path, &[("take", "1"), ("take", "2"), ("skip", "0"), ("skip", "x")])
            .await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert::count(&body, 3);
    }
}

#[tokio::test]
async fn false_filter_value_means_no_filter() {
    let mut games = fixtures();
    games.push(test_game(40).unranked());
    let app = TestApp::new(&games);

    let (_, body) = app
        .get("/games", &[("filters", r#"[{"id":"rankeable","value":false}]"#)])
        .await;
    assert::count(&body, 13);

    let (_, body) = app
        .get("/games", &[("filters", r#"[{"id":"rankeable","value":"false"}]"#)])
        .await;
    assert::count(&body, 1);
}

#[tokio::test]
async fn ladders_are_listed_busiest_first() {
    let mut games = fixtures();
    games.push(test_game(30).in_ladder("weekly").in_ladder("cup"));
    let app = TestApp::new(&games);

    let (status, body) = app.get("/ladders", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "ladders": [
                {"name": "weekly", "numGames": 2},
                {"name": "cup", "numGames": 1}
            ]
        })
    );
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = TestApp::new(&[]);
    let (status, body) = app.get("/health", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
