//! In-memory statistics store.
//!
//! Evaluates compiled queries over a fixed set of games. Used by tests and
//! for running the service without a database.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{StatsStore, StoreResult};
use crate::models::{Game, GamePlayer, LadderSummary, ladder::sort_ladders};
use crate::query::registry::{
    GAME_BALANCE, GAME_CREATED_DATE, GAME_DURATION_SECONDS, GAME_HERO_SELECTION_MODE, GAME_ID,
    GAME_LADDER_NAMES, GAME_MODE, GAME_RANKEABLE, GAME_WINNER_TEAM, GP_CREATED_DATE,
    GP_GAME_MODE, GP_HERO_NAME, GP_HERO_SELECTION_MODE, GP_LADDER_NAMES, GP_PLAYER_STEAM_ID,
    GP_RANKEABLE,
};
use crate::query::{CompiledQuery, Condition, SortDirection, SortTarget, StorageRef};
use crate::ranking::{RankingRow, aggregate, sort_rows};

/// A stored column value as seen by a condition or a sort term.
#[derive(Debug, Clone, PartialEq)]
enum Field<'a> {
    Timestamp(DateTime<Utc>),
    Int(i64),
    Bool(bool),
    Text(Cow<'a, str>),
    TextList(&'a [String]),
    /// NULL, or a column this record does not carry.
    Missing,
}

/// Records a condition can be evaluated against.
trait FieldSource {
    fn field(&self, column: StorageRef) -> Field<'_>;
}

impl FieldSource for Game {
    fn field(&self, column: StorageRef) -> Field<'_> {
        match column {
            c if c == GAME_ID => Field::Int(self.id),
            c if c == GAME_CREATED_DATE => Field::Timestamp(self.created_date),
            c if c == GAME_MODE => Field::Text(Cow::Borrowed(self.game_mode.as_str())),
            c if c == GAME_HERO_SELECTION_MODE => Field::Text(Cow::Borrowed(&self.hero_selection_mode)),
            c if c == GAME_DURATION_SECONDS => Field::Int(i64::from(self.duration_seconds)),
            c if c == GAME_WINNER_TEAM => Field::Text(Cow::Borrowed(&self.winner_team)),
            c if c == GAME_RANKEABLE => Field::Bool(self.rankeable),
            c if c == GAME_BALANCE => self
                .balance
                .as_deref()
                .map_or(Field::Missing, |b| Field::Text(Cow::Borrowed(b))),
            c if c == GAME_LADDER_NAMES => Field::TextList(&self.ladder_names),
            _ => Field::Missing,
        }
    }
}

impl FieldSource for GamePlayer {
    fn field(&self, column: StorageRef) -> Field<'_> {
        match column {
            c if c == GP_CREATED_DATE => Field::Timestamp(self.created_date),
            c if c == GP_GAME_MODE => Field::Text(Cow::Borrowed(self.game_mode.as_str())),
            c if c == GP_HERO_SELECTION_MODE => Field::Text(Cow::Borrowed(&self.hero_selection_mode)),
            c if c == GP_LADDER_NAMES => Field::TextList(&self.ladder_names),
            c if c == GP_RANKEABLE => Field::Bool(self.rankeable),
            c if c == GP_PLAYER_STEAM_ID => Field::Int(self.player.steam_id),
            c if c == GP_HERO_NAME => Field::Text(Cow::Borrowed(&self.hero.name)),
            _ => Field::Missing,
        }
    }
}

/// Evaluate one condition. A missing field never matches, as NULL in SQL.
fn matches(condition: &Condition, source: &impl FieldSource) -> bool {
    match condition {
        Condition::Between { column, start, end } => {
            matches!(source.field(*column), Field::Timestamp(ts) if *start <= ts && ts <= *end)
        }
        Condition::AtLeast { column, bound } => {
            matches!(source.field(*column), Field::Timestamp(ts) if ts >= *bound)
        }
        Condition::AtMost { column, bound } => {
            matches!(source.field(*column), Field::Timestamp(ts) if ts <= *bound)
        }
        Condition::Contains { column, needle } => {
            matches!(source.field(*column), Field::Text(text) if text.contains(needle.as_str()))
        }
        Condition::Equals { column, value } => {
            matches!(source.field(*column), Field::Bool(b) if b == *value)
        }
        Condition::ArrayContains { column, element } => {
            matches!(source.field(*column), Field::TextList(list) if list.contains(element))
        }
    }
}

fn matches_all(query: &CompiledQuery, source: &impl FieldSource) -> bool {
    query
        .filter
        .conditions
        .iter()
        .all(|condition| matches(condition, source))
}

/// Compare two fields, NULLs after values.
fn compare_fields(a: &Field<'_>, b: &Field<'_>) -> Ordering {
    match (a, b) {
        (Field::Timestamp(a), Field::Timestamp(b)) => a.cmp(b),
        (Field::Int(a), Field::Int(b)) => a.cmp(b),
        (Field::Bool(a), Field::Bool(b)) => a.cmp(b),
        (Field::Text(a), Field::Text(b)) => a.cmp(b),
        (Field::Missing, Field::Missing) => Ordering::Equal,
        (_, Field::Missing) => Ordering::Less,
        (Field::Missing, _) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn compare_games(query: &CompiledQuery, a: &Game, b: &Game) -> Ordering {
    for term in &query.ordering.terms {
        let SortTarget::Column(column) = term.target else {
            continue;
        };
        let ord = compare_fields(&a.field(column), &b.field(column));
        let ord = match term.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn page_of<T>(rows: Vec<T>, query: &CompiledQuery) -> Vec<T> {
    let skip = usize::try_from(query.page.skip).unwrap_or(usize::MAX);
    let take = usize::try_from(query.page.take).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}

/// Statistics store over games held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    games: Vec<Game>,
}

impl MemoryStore {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    fn filtered_games(&self, query: &CompiledQuery) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|game| matches_all(query, *game))
            .collect()
    }

    /// Every group matching filter and search, unordered.
    fn groups(&self, query: &CompiledQuery) -> Vec<RankingRow> {
        let participations = self
            .games
            .iter()
            .flat_map(|game| game.players.iter())
            .filter(|row| row.rankeable && matches_all(query, *row));

        let mut rows = aggregate(query.entity, participations);
        if let Some(ref term) = query.search {
            rows.retain(|row| row.key.matches_search(term));
        }
        rows
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn games_page(&self, query: &CompiledQuery) -> StoreResult<Vec<Game>> {
        let mut games = self.filtered_games(query);
        games.sort_by(|a, b| compare_games(query, a, b));
        Ok(page_of(games, query).into_iter().cloned().collect())
    }

    async fn games_count(&self, query: &CompiledQuery) -> StoreResult<u64> {
        Ok(self.filtered_games(query).len() as u64)
    }

    async fn ranking_page(&self, query: &CompiledQuery) -> StoreResult<Vec<RankingRow>> {
        let mut rows = self.groups(query);
        sort_rows(&mut rows, &query.ordering);
        Ok(page_of(rows, query))
    }

    async fn ranking_count(&self, query: &CompiledQuery) -> StoreResult<u64> {
        Ok(self.groups(query).len() as u64)
    }

    async fn ladders(&self) -> StoreResult<Vec<LadderSummary>> {
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for game in &self.games {
            for name in &game.ladder_names {
                *counts.entry(name.as_str()).or_default() += 1;
            }
        }
        let mut ladders: Vec<LadderSummary> = counts
            .into_iter()
            .map(|(name, num_games)| LadderSummary {
                name: name.to_string(),
                num_games,
            })
            .collect();
        sort_ladders(&mut ladders);
        Ok(ladders)
    }

    async fn healthy(&self) -> bool {
        true
    }
}
