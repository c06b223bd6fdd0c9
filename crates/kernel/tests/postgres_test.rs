#![allow(clippy::unwrap_used, clippy::expect_used)]
//! PostgreSQL store tests.
//!
//! Each test creates its own schema in the database at `DATABASE_URL`,
//! applies `schema.sql`, seeds fixtures and checks `PgStatsStore` against
//! `MemoryStore` over the same games. Without `DATABASE_URL` the tests
//! return early.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use matchstats_kernel::models::Game;
use matchstats_kernel::query::{FilterDescriptor, ListRequest, Pagination, SortDescriptor};
use matchstats_kernel::ranking::{GroupKey, RankingRow};
use matchstats_kernel::service::StatsService;
use matchstats_kernel::store::{MemoryStore, PgStatsStore};
use matchstats_test_utils::{TestGame, test_game, test_participation};

const SCHEMA_SQL: &str = include_str!("../schema.sql");

static NEXT_SCHEMA: AtomicUsize = AtomicUsize::new(0);

/// A seeded schema with a PostgreSQL service and a memory service over the
/// same games.
struct PgFixture {
    admin: PgPool,
    pool: PgPool,
    schema: String,
    postgres: StatsService,
    memory: StatsService,
}

impl PgFixture {
    async fn new(fixtures: &[TestGame]) -> Option<Self> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
            return None;
        };

        let schema = format!(
            "matchstats_test_{}_{}",
            std::process::id(),
            NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
        );
        let admin = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        sqlx::raw_sql(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema};"
        ))
        .execute(&admin)
        .await
        .expect("create test schema");

        let options: PgConnectOptions = url.parse().expect("parse DATABASE_URL");
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_with(options.options([("search_path", schema.as_str())]))
            .await
            .expect("connect to test schema");
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&pool)
            .await
            .expect("apply schema.sql");

        let games: Vec<Game> = fixtures.iter().map(common::to_game).collect();
        seed(&pool, &games).await;

        let timeout = Duration::from_secs(10);
        Some(Self {
            postgres: StatsService::new(Arc::new(PgStatsStore::new(pool.clone())), timeout),
            memory: StatsService::new(Arc::new(MemoryStore::new(games)), timeout),
            admin,
            pool,
            schema,
        })
    }

    async fn teardown(self) {
        self.pool.close().await;
        sqlx::raw_sql(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("drop test schema");
    }
}

async fn seed(pool: &PgPool, games: &[Game]) {
    let mut ladders: BTreeMap<&str, i32> = BTreeMap::new();

    for game in games {
        sqlx::query(
            "INSERT INTO game (id, created_date, game_mode, hero_selection_mode, \
             duration_seconds, winner_team, rankeable, balance, ladder_names) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(game.id)
        .bind(game.created_date)
        .bind(game.game_mode.as_str())
        .bind(&game.hero_selection_mode)
        .bind(game.duration_seconds)
        .bind(&game.winner_team)
        .bind(game.rankeable)
        .bind(&game.balance)
        .bind(&game.ladder_names)
        .execute(pool)
        .await
        .expect("insert game");

        for name in &game.ladder_names {
            *ladders.entry(name.as_str()).or_default() += 1;
        }

        for gp in &game.players {
            sqlx::query(
                "INSERT INTO player (steam_id, name) VALUES ($1, $2) \
                 ON CONFLICT (steam_id) DO NOTHING",
            )
            .bind(gp.player.steam_id)
            .bind(&gp.player.name)
            .execute(pool)
            .await
            .expect("insert player");

            sqlx::query(
                "INSERT INTO game_player (id, game_id, created_date, state, player_steam_id, \
                 hero_name, kills, deaths, assists, points, level, team, winner, rankeable, \
                 game_mode, hero_selection_mode, ladder_names) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            )
            .bind(gp.id)
            .bind(game.id)
            .bind(gp.created_date)
            .bind(&gp.state)
            .bind(gp.player.steam_id)
            .bind(&gp.hero.name)
            .bind(gp.kills)
            .bind(gp.deaths)
            .bind(gp.assists)
            .bind(gp.points)
            .bind(gp.level)
            .bind(&gp.team)
            .bind(gp.winner)
            .bind(gp.rankeable)
            .bind(gp.game_mode.as_str())
            .bind(&gp.hero_selection_mode)
            .bind(&gp.ladder_names)
            .execute(pool)
            .await
            .expect("insert game_player");

            for item in &gp.items {
                sqlx::query("INSERT INTO game_player_item (game_player_id, item_name) VALUES ($1, $2)")
                    .bind(gp.id)
                    .bind(&item.name)
                    .execute(pool)
                    .await
                    .expect("insert item");
            }
        }
    }

    for (name, num_games) in ladders {
        sqlx::query("INSERT INTO ladder (name, num_games) VALUES ($1, $2)")
            .bind(name)
            .bind(num_games)
            .execute(pool)
            .await
            .expect("insert ladder");
    }
}

/// The league plus games exercising items, balance text and stat averages.
fn fixtures() -> Vec<TestGame> {
    let mut games = common::league();
    games.push(
        test_game(100)
            .with_mode("NORMAL")
            .with_balance("v2.1 50%")
            .in_ladder("cup")
            .in_ladder("weekly")
            .with_player(
                test_participation(1, "Naruto")
                    .won()
                    .with_stats(7, 2, 11, 340)
                    .with_item("Kunai")
                    .with_item("Scroll"),
            )
            .with_player(test_participation(6, "Gaara").lost().with_stats(3, 5, 1, 120)),
    );
    games.push(
        test_game(101)
            .with_balance("v2.2")
            .with_player(test_participation(6, "Gaara").won().with_stats(9, 0, 4, 410)),
    );
    games
}

fn assert_rankings_match(postgres: &[RankingRow], memory: &[RankingRow]) {
    assert_eq!(postgres.len(), memory.len());
    for (pg, mem) in postgres.iter().zip(memory) {
        assert_eq!(pg.key, mem.key);
        assert_eq!(
            (pg.stats.wins, pg.stats.losses, pg.stats.games, pg.stats.heroes),
            (mem.stats.wins, mem.stats.losses, mem.stats.games, mem.stats.heroes),
            "{:?}",
            pg.key
        );
        for (name, a, b) in [
            ("kills", pg.stats.kills, mem.stats.kills),
            ("deaths", pg.stats.deaths, mem.stats.deaths),
            ("assists", pg.stats.assists, mem.stats.assists),
            ("points", pg.stats.points, mem.stats.points),
            ("score", pg.stats.score, mem.stats.score),
        ] {
            assert!((a - b).abs() < 1e-6, "{name} of {:?}: {a} vs {b}", pg.key);
        }
    }
}

fn requests() -> Vec<ListRequest> {
    vec![
        ListRequest::default(),
        ListRequest {
            filters: vec![
                FilterDescriptor::text("gameMode", "point 30"),
                FilterDescriptor::text("ladder", "Weekly"),
            ],
            page: Pagination { take: 3, skip: 1 },
            ..Default::default()
        },
        ListRequest {
            filters: vec![FilterDescriptor::text("ladder", "public")],
            sorting: vec![SortDescriptor::new("kills", true)],
            ..Default::default()
        },
        ListRequest {
            filters: vec![FilterDescriptor::range(
                "createdDate",
                Some("2024-01-01"),
                None,
            )],
            sorting: vec![SortDescriptor::new("wins", false)],
            page: Pagination { take: 4, skip: 0 },
            ..Default::default()
        },
    ]
}

#[tokio::test]
async fn game_pages_match_memory_store() {
    let Some(fx) = PgFixture::new(&fixtures()).await else {
        return;
    };

    let mut game_requests = requests();
    game_requests.push(ListRequest {
        filters: vec![
            FilterDescriptor::text("balance", "50%"),
            FilterDescriptor::text("rankeable", "true"),
        ],
        ..Default::default()
    });
    game_requests.push(ListRequest {
        sorting: vec![SortDescriptor::new("durationSeconds", true)],
        page: Pagination { take: 5, skip: 20 },
        ..Default::default()
    });

    for request in &game_requests {
        let pg = fx.postgres.list_games(request).await.unwrap();
        let mem = fx.memory.list_games(request).await.unwrap();
        assert_eq!(pg, mem, "{request:?}");
    }

    // Items and balance survive the round trip.
    let page = fx
        .postgres
        .list_games(&ListRequest {
            filters: vec![FilterDescriptor::text("balance", "v2.1")],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    let items: Vec<_> = page.rows[0].players[0].items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(items, ["Kunai", "Scroll"]);

    fx.teardown().await;
}

#[tokio::test]
async fn rankings_match_memory_store() {
    let Some(fx) = PgFixture::new(&fixtures()).await else {
        return;
    };

    let mut ranking_requests = requests();
    ranking_requests.push(ListRequest {
        search: Some("player1".to_string()),
        ..Default::default()
    });
    ranking_requests.push(ListRequest {
        search: Some("6".to_string()),
        sorting: vec![SortDescriptor::new("points", true)],
        ..Default::default()
    });

    for request in &ranking_requests {
        let pg = fx.postgres.rank_players(request).await.unwrap();
        let mem = fx.memory.rank_players(request).await.unwrap();
        assert_eq!(pg.total_count, mem.total_count, "players {request:?}");
        assert_rankings_match(&pg.rows, &mem.rows);

        let pg = fx.postgres.rank_heroes(request).await.unwrap();
        let mem = fx.memory.rank_heroes(request).await.unwrap();
        assert_eq!(pg.total_count, mem.total_count, "heroes {request:?}");
        assert_rankings_match(&pg.rows, &mem.rows);
    }

    let heroes = fx
        .postgres
        .rank_heroes(&ListRequest {
            search: Some("Gaa".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(heroes.total_count, 1);
    assert!(heroes.rows[0].stats.heroes.is_none());

    fx.teardown().await;
}

#[tokio::test]
async fn ladders_match_memory_store() {
    let Some(fx) = PgFixture::new(&fixtures()).await else {
        return;
    };

    assert_eq!(
        fx.postgres.ladders().await.unwrap(),
        fx.memory.ladders().await.unwrap()
    );
    assert!(fx.postgres.healthy().await);

    fx.teardown().await;
}

#[tokio::test]
async fn participations_without_player_row_form_no_player_group() {
    let Some(fx) = PgFixture::new(&fixtures()).await else {
        return;
    };
    sqlx::query("DELETE FROM player WHERE steam_id = 6")
        .execute(&fx.pool)
        .await
        .unwrap();

    let request = ListRequest {
        page: Pagination { take: 100, skip: 0 },
        ..Default::default()
    };
    let players = fx.postgres.rank_players(&request).await.unwrap();
    assert_eq!(players.total_count, players.rows.len() as u64);
    assert!(players.rows.iter().all(|row| match &row.key {
        GroupKey::Player { steam_id, .. } => *steam_id != 6,
        GroupKey::Hero { .. } => false,
    }));
    assert_eq!(players.total_count, 5);

    // Hero rankings still count those participations.
    let heroes = fx.postgres.rank_heroes(&request).await.unwrap();
    let gaara = heroes
        .rows
        .iter()
        .find(|row| matches!(&row.key, GroupKey::Hero { hero_name } if hero_name == "Gaara"))
        .expect("Gaara row");
    assert_eq!(gaara.stats.games, 2);

    fx.teardown().await;
}
