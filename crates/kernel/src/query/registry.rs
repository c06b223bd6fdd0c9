//! Static column registry.
//!
//! Maps client filter/sort identifiers to their value kind and storage
//! column, per entity. The tables are immutable statics, so concurrent
//! lookups need no synchronization. Unknown ids are a silent miss.

use super::types::{
    Aggregate, ColumnSpec, EntityKind, FilterKind, SortColumn, SortDirection, SortTarget,
    StorageRef,
};

pub const GAME_TABLE: &str = "game";
pub const GAME_PLAYER_TABLE: &str = "game_player";
pub const PLAYER_TABLE: &str = "player";

/// Primary key of a game; tie-breaker for game ordering.
pub const GAME_ID: StorageRef = StorageRef::new(GAME_TABLE, "id");
pub const GAME_CREATED_DATE: StorageRef = StorageRef::new(GAME_TABLE, "created_date");
pub const GAME_MODE: StorageRef = StorageRef::new(GAME_TABLE, "game_mode");
pub const GAME_HERO_SELECTION_MODE: StorageRef =
    StorageRef::new(GAME_TABLE, "hero_selection_mode");
pub const GAME_DURATION_SECONDS: StorageRef = StorageRef::new(GAME_TABLE, "duration_seconds");
pub const GAME_WINNER_TEAM: StorageRef = StorageRef::new(GAME_TABLE, "winner_team");
pub const GAME_RANKEABLE: StorageRef = StorageRef::new(GAME_TABLE, "rankeable");
pub const GAME_BALANCE: StorageRef = StorageRef::new(GAME_TABLE, "balance");
pub const GAME_LADDER_NAMES: StorageRef = StorageRef::new(GAME_TABLE, "ladder_names");

pub const GP_CREATED_DATE: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "created_date");
pub const GP_GAME_MODE: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "game_mode");
pub const GP_HERO_SELECTION_MODE: StorageRef =
    StorageRef::new(GAME_PLAYER_TABLE, "hero_selection_mode");
pub const GP_LADDER_NAMES: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "ladder_names");
pub const GP_RANKEABLE: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "rankeable");
pub const GP_PLAYER_STEAM_ID: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "player_steam_id");
pub const GP_HERO_NAME: StorageRef = StorageRef::new(GAME_PLAYER_TABLE, "hero_name");

pub const PLAYER_STEAM_ID: StorageRef = StorageRef::new(PLAYER_TABLE, "steam_id");
pub const PLAYER_NAME: StorageRef = StorageRef::new(PLAYER_TABLE, "name");

/// Filter value that selects the default (unfiltered) ladder.
pub const DEFAULT_GROUP_SENTINEL: &str = "public";

static GAME_FILTERS: &[ColumnSpec] = &[
    ColumnSpec {
        id: "createdDate",
        kind: FilterKind::DateRange,
        storage: GAME_CREATED_DATE,
    },
    ColumnSpec {
        id: "gameMode",
        kind: FilterKind::EnumLike,
        storage: GAME_MODE,
    },
    ColumnSpec {
        id: "heroSelectionMode",
        kind: FilterKind::EnumLike,
        storage: GAME_HERO_SELECTION_MODE,
    },
    ColumnSpec {
        id: "rankeable",
        kind: FilterKind::Boolean,
        storage: GAME_RANKEABLE,
    },
    ColumnSpec {
        id: "balance",
        kind: FilterKind::StringContains,
        storage: GAME_BALANCE,
    },
    ColumnSpec {
        id: "ladder",
        kind: FilterKind::SetMembership,
        storage: GAME_LADDER_NAMES,
    },
];

static PARTICIPATION_FILTERS: &[ColumnSpec] = &[
    ColumnSpec {
        id: "createdDate",
        kind: FilterKind::DateRange,
        storage: GP_CREATED_DATE,
    },
    ColumnSpec {
        id: "gameMode",
        kind: FilterKind::EnumLike,
        storage: GP_GAME_MODE,
    },
    ColumnSpec {
        id: "heroSelectionMode",
        kind: FilterKind::EnumLike,
        storage: GP_HERO_SELECTION_MODE,
    },
    ColumnSpec {
        id: "ladder",
        kind: FilterKind::SetMembership,
        storage: GP_LADDER_NAMES,
    },
];

static GAME_SORTS: &[SortColumn] = &[
    SortColumn {
        id: "createdDate",
        target: SortTarget::Column(GAME_CREATED_DATE),
    },
    SortColumn {
        id: "durationSeconds",
        target: SortTarget::Column(GAME_DURATION_SECONDS),
    },
    SortColumn {
        id: "rankeable",
        target: SortTarget::Column(GAME_RANKEABLE),
    },
    SortColumn {
        id: "balance",
        target: SortTarget::Column(GAME_BALANCE),
    },
];

const fn aggregate_sort(id: &'static str, aggregate: Aggregate) -> SortColumn {
    SortColumn {
        id,
        target: SortTarget::Aggregate(aggregate),
    }
}

static PLAYER_SORTS: &[SortColumn] = &[
    aggregate_sort("kills", Aggregate::Kills),
    aggregate_sort("deaths", Aggregate::Deaths),
    aggregate_sort("assists", Aggregate::Assists),
    aggregate_sort("points", Aggregate::Points),
    aggregate_sort("wins", Aggregate::Wins),
    aggregate_sort("losses", Aggregate::Losses),
    aggregate_sort("games", Aggregate::Games),
    aggregate_sort("heroes", Aggregate::Heroes),
    aggregate_sort("score", Aggregate::Score),
];

// Distinct heroes is not computed when grouping by hero.
static HERO_SORTS: &[SortColumn] = &[
    aggregate_sort("kills", Aggregate::Kills),
    aggregate_sort("deaths", Aggregate::Deaths),
    aggregate_sort("assists", Aggregate::Assists),
    aggregate_sort("points", Aggregate::Points),
    aggregate_sort("wins", Aggregate::Wins),
    aggregate_sort("losses", Aggregate::Losses),
    aggregate_sort("games", Aggregate::Games),
    aggregate_sort("score", Aggregate::Score),
];

/// All filterable columns of an entity.
pub fn filter_columns(entity: EntityKind) -> &'static [ColumnSpec] {
    match entity {
        EntityKind::Game => GAME_FILTERS,
        EntityKind::Player | EntityKind::Hero => PARTICIPATION_FILTERS,
    }
}

/// All sortable columns of an entity.
pub fn sort_columns(entity: EntityKind) -> &'static [SortColumn] {
    match entity {
        EntityKind::Game => GAME_SORTS,
        EntityKind::Player => PLAYER_SORTS,
        EntityKind::Hero => HERO_SORTS,
    }
}

/// Look up a filter column by exact, case-sensitive id.
pub fn filter_column(entity: EntityKind, id: &str) -> Option<&'static ColumnSpec> {
    filter_columns(entity).iter().find(|spec| spec.id == id)
}

/// Look up a sort column by exact, case-sensitive id.
pub fn sort_column(entity: EntityKind, id: &str) -> Option<&'static SortColumn> {
    sort_columns(entity).iter().find(|col| col.id == id)
}

/// Ordering applied when no sort descriptor matched.
pub fn default_ordering(entity: EntityKind) -> (SortTarget, SortDirection) {
    match entity {
        EntityKind::Game => (SortTarget::Column(GAME_CREATED_DATE), SortDirection::Desc),
        EntityKind::Player | EntityKind::Hero => {
            (SortTarget::Aggregate(Aggregate::Score), SortDirection::Desc)
        }
    }
}

/// Final ordering term that makes pagination deterministic.
pub fn tie_breaker(entity: EntityKind) -> SortTarget {
    match entity {
        EntityKind::Game => SortTarget::Column(GAME_ID),
        EntityKind::Player | EntityKind::Hero => SortTarget::GroupKey,
    }
}

/// Column the ranking query groups by.
pub fn group_key_column(entity: EntityKind) -> Option<StorageRef> {
    match entity {
        EntityKind::Game => None,
        EntityKind::Player => Some(PLAYER_STEAM_ID),
        EntityKind::Hero => Some(GP_HERO_NAME),
    }
}
