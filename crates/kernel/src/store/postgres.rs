//! PostgreSQL statistics store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::bind::pg_arguments;
use super::{StatsStore, StoreResult};
use crate::db;
use crate::models::{Game, GameMode, GamePlayer, Hero, Item, LadderSummary, Player};
use crate::query::{CompiledQuery, EntityKind, StatsQueryBuilder};
use crate::ranking::{AggregateStats, GroupKey, RankingRow};

/// Participations of a page of games, with player names and item names.
const PARTICIPATIONS_SQL: &str = r#"
    SELECT
        gp.game_id,
        gp.id,
        gp.created_date,
        gp.state,
        gp.player_steam_id AS steam_id,
        COALESCE(p.name, '') AS player_name,
        gp.hero_name,
        gp.kills,
        gp.deaths,
        gp.assists,
        gp.points,
        gp.level,
        gp.team,
        gp.winner,
        gp.rankeable,
        gp.game_mode,
        gp.hero_selection_mode,
        gp.ladder_names,
        ARRAY(
            SELECT gpi.item_name FROM game_player_item gpi
            WHERE gpi.game_player_id = gp.id
            ORDER BY gpi.item_name
        ) AS items
    FROM game_player gp
    LEFT JOIN player p ON p.steam_id = gp.player_steam_id
    WHERE gp.game_id = ANY($1)
    ORDER BY gp.game_id, gp.id
"#;

const LADDERS_SQL: &str =
    "SELECT name, num_games::bigint AS num_games FROM ladder ORDER BY num_games DESC, name ASC";

#[derive(sqlx::FromRow)]
struct GameRow {
    id: i64,
    created_date: DateTime<Utc>,
    game_mode: String,
    hero_selection_mode: String,
    duration_seconds: i32,
    winner_team: String,
    rankeable: bool,
    balance: Option<String>,
    ladder_names: Vec<String>,
}

impl GameRow {
    fn into_game(self, players: Vec<GamePlayer>) -> StoreResult<Game> {
        Ok(Game {
            id: self.id,
            created_date: self.created_date,
            game_mode: self.game_mode.parse()?,
            hero_selection_mode: self.hero_selection_mode,
            duration_seconds: self.duration_seconds,
            winner_team: self.winner_team,
            rankeable: self.rankeable,
            balance: self.balance,
            ladder_names: self.ladder_names,
            players,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ParticipationRow {
    game_id: i64,
    id: i64,
    created_date: DateTime<Utc>,
    state: String,
    steam_id: i64,
    player_name: String,
    hero_name: String,
    kills: i32,
    deaths: i32,
    assists: i32,
    points: i32,
    level: i32,
    team: String,
    winner: bool,
    rankeable: bool,
    game_mode: String,
    hero_selection_mode: String,
    ladder_names: Vec<String>,
    items: Vec<String>,
}

impl ParticipationRow {
    fn into_game_player(self) -> StoreResult<(i64, GamePlayer)> {
        let game_mode: GameMode = self.game_mode.parse()?;
        let player = GamePlayer {
            id: self.id,
            created_date: self.created_date,
            state: self.state,
            player: Player {
                steam_id: self.steam_id,
                name: self.player_name,
            },
            hero: Hero {
                name: self.hero_name,
            },
            kills: self.kills,
            deaths: self.deaths,
            assists: self.assists,
            points: self.points,
            level: self.level,
            team: self.team,
            winner: self.winner,
            rankeable: self.rankeable,
            items: self.items.into_iter().map(|name| Item { name }).collect(),
            game_mode,
            hero_selection_mode: self.hero_selection_mode,
            ladder_names: self.ladder_names,
        };
        Ok((self.game_id, player))
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRankingRow {
    steam_id: i64,
    name: String,
    #[sqlx(flatten)]
    stats: AggregateStats,
}

#[derive(sqlx::FromRow)]
struct HeroRankingRow {
    hero_name: String,
    #[sqlx(flatten)]
    stats: AggregateStats,
}

/// Statistics store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load participations for the given games, grouped by game id.
    async fn participations(&self, game_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<GamePlayer>>> {
        if game_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ParticipationRow>(PARTICIPATIONS_SQL)
            .bind(game_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_game: HashMap<i64, Vec<GamePlayer>> = HashMap::new();
        for row in rows {
            let (game_id, player) = row.into_game_player()?;
            by_game.entry(game_id).or_default().push(player);
        }
        Ok(by_game)
    }

    async fn count(&self, (sql, values): (String, sea_query::Values)) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar_with(&sql, pg_arguments(values)?)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn games_page(&self, query: &CompiledQuery) -> StoreResult<Vec<Game>> {
        let (sql, values) = StatsQueryBuilder::new(query).build_games();
        debug!(sql = %sql, "games page query");

        let rows: Vec<GameRow> = sqlx::query_as_with(&sql, pg_arguments(values)?)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut players = self.participations(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let game_players = players.remove(&row.id).unwrap_or_default();
                row.into_game(game_players)
            })
            .collect()
    }

    async fn games_count(&self, query: &CompiledQuery) -> StoreResult<u64> {
        self.count(StatsQueryBuilder::new(query).build_games_count())
            .await
    }

    async fn ranking_page(&self, query: &CompiledQuery) -> StoreResult<Vec<RankingRow>> {
        let (sql, values) = StatsQueryBuilder::new(query).build_ranking();
        debug!(sql = %sql, entity = ?query.entity, "ranking page query");
        let args = pg_arguments(values)?;

        match query.entity {
            EntityKind::Player => {
                let rows: Vec<PlayerRankingRow> = sqlx::query_as_with(&sql, args)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|row| RankingRow {
                        key: GroupKey::Player {
                            steam_id: row.steam_id,
                            name: row.name,
                        },
                        stats: row.stats,
                    })
                    .collect())
            }
            EntityKind::Hero => {
                let rows: Vec<HeroRankingRow> = sqlx::query_as_with(&sql, args)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(rows
                    .into_iter()
                    .map(|row| RankingRow {
                        key: GroupKey::Hero {
                            hero_name: row.hero_name,
                        },
                        stats: row.stats,
                    })
                    .collect())
            }
            EntityKind::Game => Ok(Vec::new()),
        }
    }

    async fn ranking_count(&self, query: &CompiledQuery) -> StoreResult<u64> {
        if !query.entity.is_ranking() {
            return Ok(0);
        }
        self.count(StatsQueryBuilder::new(query).build_ranking_count())
            .await
    }

    async fn ladders(&self) -> StoreResult<Vec<LadderSummary>> {
        let ladders = sqlx::query_as::<_, LadderSummary>(LADDERS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(ladders)
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }
}
