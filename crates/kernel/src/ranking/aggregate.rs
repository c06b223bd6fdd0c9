//! In-process ranking aggregation.
//!
//! Groups participations by player or hero and computes the same statistics
//! the database aggregate produces, then orders rows by a compiled ordering.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::score::wilson_score;
use crate::models::GamePlayer;
use crate::query::{Aggregate, CompiledOrdering, EntityKind, SortDirection, SortTarget};

/// Identity of a ranking group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Player {
        #[serde(rename = "steamId")]
        steam_id: i64,
        name: String,
    },
    Hero {
        #[serde(rename = "heroName")]
        hero_name: String,
    },
}

impl GroupKey {
    /// Whether the display identifier contains `term` (case-sensitive).
    ///
    /// Players match on their name or their steam id rendered as text.
    pub fn matches_search(&self, term: &str) -> bool {
        match self {
            Self::Player { steam_id, name } => {
                steam_id.to_string().contains(term) || name.contains(term)
            }
            Self::Hero { hero_name } => hero_name.contains(term),
        }
    }
}

/// Aggregate statistics of one group. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AggregateStats {
    pub kills: f64,
    pub deaths: f64,
    pub assists: f64,
    pub points: f64,
    pub wins: i64,
    pub losses: i64,
    /// Participations counted.
    pub games: i64,
    /// Distinct heroes played; only computed when grouping by player.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heroes: Option<i64>,
    pub score: f64,
}

impl AggregateStats {
    /// Value of an aggregate column, as used for ordering.
    pub fn value(&self, aggregate: Aggregate) -> Option<f64> {
        match aggregate {
            Aggregate::Kills => Some(self.kills),
            Aggregate::Deaths => Some(self.deaths),
            Aggregate::Assists => Some(self.assists),
            Aggregate::Points => Some(self.points),
            Aggregate::Wins => Some(self.wins as f64),
            Aggregate::Losses => Some(self.losses as f64),
            Aggregate::Games => Some(self.games as f64),
            Aggregate::Heroes => self.heroes.map(|h| h as f64),
            Aggregate::Score => Some(self.score),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    #[serde(flatten)]
    pub key: GroupKey,
    #[serde(flatten)]
    pub stats: AggregateStats,
}

#[derive(Default)]
struct Accumulator {
    kills: i64,
    deaths: i64,
    assists: i64,
    points: i64,
    wins: u64,
    losses: u64,
    games: u64,
    heroes: BTreeSet<String>,
}

impl Accumulator {
    fn add(&mut self, row: &GamePlayer) {
        self.kills += i64::from(row.kills);
        self.deaths += i64::from(row.deaths);
        self.assists += i64::from(row.assists);
        self.points += i64::from(row.points);
        if row.winner {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.games += 1;
        self.heroes.insert(row.hero.name.clone());
    }

    fn finish(self, count_heroes: bool) -> AggregateStats {
        let mean = |sum: i64| {
            if self.games == 0 {
                0.0
            } else {
                sum as f64 / self.games as f64
            }
        };
        AggregateStats {
            kills: mean(self.kills),
            deaths: mean(self.deaths),
            assists: mean(self.assists),
            points: mean(self.points),
            wins: self.wins as i64,
            losses: self.losses as i64,
            games: self.games as i64,
            heroes: count_heroes.then_some(self.heroes.len() as i64),
            score: wilson_score(self.wins, self.losses),
        }
    }
}

fn group_key(entity: EntityKind, row: &GamePlayer) -> Option<GroupKey> {
    match entity {
        EntityKind::Player => Some(GroupKey::Player {
            steam_id: row.player.steam_id,
            name: row.player.name.clone(),
        }),
        EntityKind::Hero => Some(GroupKey::Hero {
            hero_name: row.hero.name.clone(),
        }),
        EntityKind::Game => None,
    }
}

/// Group participations and compute per-group statistics.
///
/// Rows come back in group-key order; apply [`sort_rows`] for the requested
/// ordering. Games are not a ranking entity and yield no rows.
pub fn aggregate<'a, I>(entity: EntityKind, rows: I) -> Vec<RankingRow>
where
    I: IntoIterator<Item = &'a GamePlayer>,
{
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for row in rows {
        let Some(key) = group_key(entity, row) else {
            continue;
        };
        groups.entry(key).or_default().add(row);
    }

    let count_heroes = entity == EntityKind::Player;
    groups
        .into_iter()
        .map(|(key, acc)| RankingRow {
            key,
            stats: acc.finish(count_heroes),
        })
        .collect()
}

/// Order rows by the compiled ordering terms.
pub fn sort_rows(rows: &mut [RankingRow], ordering: &CompiledOrdering) {
    rows.sort_by(|a, b| {
        for term in &ordering.terms {
            let ord = match term.target {
                SortTarget::Aggregate(aggregate) => {
                    compare_nulls_last(a.stats.value(aggregate), b.stats.value(aggregate))
                }
                SortTarget::GroupKey => a.key.cmp(&b.key),
                // Stored columns are not part of the aggregate output.
                SortTarget::Column(_) => Ordering::Equal,
            };
            let ord = match term.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Compare optional values with NULL sorting after every value in ascending order,
/// matching PostgreSQL's default.
pub fn compare_nulls_last<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
