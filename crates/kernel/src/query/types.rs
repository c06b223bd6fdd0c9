//! Query descriptor types.
//!
//! Provides type definitions for the list/ranking query language:
//! - ColumnSpec / SortColumn: registry entries (what a client id maps to)
//! - FilterDescriptor / SortDescriptor: parsed client input
//! - ListRequest / PageResult: request and response shapes for the executor

use serde::{Deserialize, Serialize};

/// Default page size when `take` is absent or unusable.
pub const DEFAULT_TAKE: u64 = 10;

/// Entity a list or ranking query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Recorded matches, returned as full entities.
    Game,
    /// Per-player leaderboard over participations.
    Player,
    /// Per-hero leaderboard over participations.
    Hero,
}

impl EntityKind {
    /// Key holding the row array in the response envelope.
    pub fn items_key(&self) -> &'static str {
        match self {
            Self::Game => "games",
            Self::Player => "players",
            Self::Hero => "heroes",
        }
    }

    /// Whether rows of this entity are aggregated from participations.
    pub fn is_ranking(&self) -> bool {
        !matches!(self, Self::Game)
    }
}

/// Value kind of a filterable column. Selects the predicate builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `[start?, end?]` timestamp bounds.
    DateRange,
    /// Human-written enum text ("point 45") matched against stored `POINT_45`.
    EnumLike,
    /// `"true"` or anything else (false).
    Boolean,
    /// Case-sensitive substring.
    StringContains,
    /// Element of a text array column.
    SetMembership,
}

/// Table-qualified column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageRef {
    pub table: &'static str,
    pub column: &'static str,
}

impl StorageRef {
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }
}

/// A filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Client-facing identifier (e.g. `gameMode`).
    pub id: &'static str,
    pub kind: FilterKind,
    pub storage: StorageRef,
}

/// Per-group aggregate produced by the ranking query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Kills,
    Deaths,
    Assists,
    Points,
    Wins,
    Losses,
    Games,
    Heroes,
    Score,
}

impl Aggregate {
    /// Output column alias in the ranking SELECT.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::Kills => "kills",
            Self::Deaths => "deaths",
            Self::Assists => "assists",
            Self::Points => "points",
            Self::Wins => "wins",
            Self::Losses => "losses",
            Self::Games => "games",
            Self::Heroes => "heroes",
            Self::Score => "score",
        }
    }
}

/// What a sort term orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget {
    /// A stored column of the base table.
    Column(StorageRef),
    /// An aggregate output column of the ranking query.
    Aggregate(Aggregate),
    /// The grouping key of the ranking query (steam id or hero name).
    GroupKey,
}

/// A sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortColumn {
    pub id: &'static str,
    pub target: SortTarget,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Parsed filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Plain text value.
    Text(String),
    /// Two-element range; either bound may be missing.
    Range(Option<String>, Option<String>),
}

/// One client filter criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub id: String,
    pub value: FilterValue,
}

impl FilterDescriptor {
    pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: FilterValue::Text(value.into()),
        }
    }

    pub fn range(id: impl Into<String>, start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            id: id.into(),
            value: FilterValue::Range(start.map(str::to_string), end.map(str::to_string)),
        }
    }
}

/// One client sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub id: String,
    pub descending: bool,
}

impl SortDescriptor {
    pub fn new(id: impl Into<String>, descending: bool) -> Self {
        Self {
            id: id.into(),
            descending,
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub take: u64,
    pub skip: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            take: DEFAULT_TAKE,
            skip: 0,
        }
    }
}

/// A fully parsed list or ranking request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub filters: Vec<FilterDescriptor>,
    pub sorting: Vec<SortDescriptor>,
    pub page: Pagination,
    /// Free-text restriction on the group's display identifier (ranking only).
    pub search: Option<String>,
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub rows: Vec<T>,
    /// Row count before pagination, under the same compiled filter.
    pub total_count: u64,
}

impl<T> PageResult<T> {
    pub fn new(rows: Vec<T>, total_count: u64) -> Self {
        Self { rows, total_count }
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total_count: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn items_keys() {
        assert_eq!(EntityKind::Game.items_key(), "games");
        assert_eq!(EntityKind::Player.items_key(), "players");
        assert_eq!(EntityKind::Hero.items_key(), "heroes");
    }

    #[test]
    fn pagination_defaults() {
        let page = Pagination::default();
        assert_eq!(page.take, 10);
        assert_eq!(page.skip, 0);
    }

    #[test]
    fn sort_descriptor_direction() {
        assert_eq!(SortDescriptor::new("kills", true).direction(), SortDirection::Desc);
        assert_eq!(SortDescriptor::new("kills", false).direction(), SortDirection::Asc);
    }

    #[test]
    fn sort_direction_serialization() {
        let json = serde_json::to_string(&SortDirection::Desc).unwrap();
        assert_eq!(json, "\"desc\"");
    }

    #[test]
    fn empty_page_result() {
        let page: PageResult<u32> = PageResult::empty();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 0);
    }
}
