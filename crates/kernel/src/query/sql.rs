//! Query builder using SeaQuery.
//!
//! Renders a [`CompiledQuery`] into parameterized PostgreSQL:
//! - Game list page and count
//! - Ranking aggregate page and grouped count
//!
//! The page and count statements share one WHERE builder, so they can only
//! differ in projection, ordering and pagination. Every filter value is
//! emitted as a `$n` placeholder with its value in the returned [`Values`].

use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, JoinType, Order, PostgresQueryBuilder, Query,
    SelectStatement, SimpleExpr, Values,
};

use super::compiler::{CompiledQuery, Condition};
use super::registry::{
    self, GAME_BALANCE, GAME_CREATED_DATE, GAME_DURATION_SECONDS, GAME_HERO_SELECTION_MODE,
    GAME_ID, GAME_LADDER_NAMES, GAME_MODE, GAME_PLAYER_TABLE, GAME_RANKEABLE, GAME_TABLE,
    GAME_WINNER_TEAM, GP_HERO_NAME, GP_PLAYER_STEAM_ID, GP_RANKEABLE, PLAYER_NAME,
    PLAYER_STEAM_ID, PLAYER_TABLE,
};
use super::types::{Aggregate, EntityKind, SortDirection, SortTarget, StorageRef};
use crate::ranking::wilson_score_sql;

/// Columns selected for a game row.
const GAME_COLUMNS: [StorageRef; 9] = [
    GAME_ID,
    GAME_CREATED_DATE,
    GAME_MODE,
    GAME_HERO_SELECTION_MODE,
    GAME_DURATION_SECONDS,
    GAME_WINNER_TEAM,
    GAME_RANKEABLE,
    GAME_BALANCE,
    GAME_LADDER_NAMES,
];

/// Alias of the grouped subquery in the ranking count.
const RANKED_GROUPS: &str = "ranked_groups";

/// Query builder for list and ranking queries.
pub struct StatsQueryBuilder<'a> {
    query: &'a CompiledQuery,
}

impl<'a> StatsQueryBuilder<'a> {
    pub fn new(query: &'a CompiledQuery) -> Self {
        Self { query }
    }

    /// Build the game list SELECT with pagination.
    pub fn build_games(&self) -> (String, Values) {
        let mut query = Query::select();
        for column in GAME_COLUMNS {
            query.column(col_ref(column));
        }
        query.from(Alias::new(GAME_TABLE));
        self.add_conditions(&mut query);
        self.add_ordering(&mut query);
        self.add_pagination(&mut query);
        query.build(PostgresQueryBuilder)
    }

    /// Build a COUNT query for the game list.
    pub fn build_games_count(&self) -> (String, Values) {
        let mut query = Query::select();
        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(GAME_TABLE));
        self.add_conditions(&mut query);
        query.build(PostgresQueryBuilder)
    }

    /// Build the ranking aggregate SELECT with ordering and pagination.
    pub fn build_ranking(&self) -> (String, Values) {
        let mut query = self.ranking_base();
        match self.query.entity {
            EntityKind::Player => {
                query.expr_as(col(PLAYER_STEAM_ID), Alias::new("steam_id"));
                query.expr_as(col(PLAYER_NAME), Alias::new("name"));
            }
            EntityKind::Hero | EntityKind::Game => {
                query.expr_as(col(GP_HERO_NAME), Alias::new("hero_name"));
            }
        }
        self.add_aggregates(&mut query);
        self.add_ordering(&mut query);
        self.add_pagination(&mut query);
        query.build(PostgresQueryBuilder)
    }

    /// Build the number of groups matching the ranking filter.
    pub fn build_ranking_count(&self) -> (String, Values) {
        let mut groups = self.ranking_base();
        if let Some(key) = registry::group_key_column(self.query.entity) {
            groups.column(col_ref(key));
        }

        let mut query = Query::select();
        query.expr_as(Expr::col(Asterisk).count(), Alias::new("count"));
        query.from_subquery(groups, Alias::new(RANKED_GROUPS));
        query.build(PostgresQueryBuilder)
    }

    /// FROM, JOIN, WHERE and GROUP BY shared by the ranking page and count.
    fn ranking_base(&self) -> SelectStatement {
        let mut query = Query::select();
        query.from(Alias::new(GAME_PLAYER_TABLE));

        // Participations without a player row form no player group.
        if self.query.entity == EntityKind::Player {
            query.join(
                JoinType::InnerJoin,
                Alias::new(PLAYER_TABLE),
                col(GP_PLAYER_STEAM_ID).equals(col_ref(PLAYER_STEAM_ID)),
            );
        }

        query.and_where(col(GP_RANKEABLE).eq(true));
        self.add_conditions(&mut query);
        self.add_search(&mut query);

        match self.query.entity {
            EntityKind::Player => {
                query.group_by_col(col_ref(PLAYER_STEAM_ID));
                query.group_by_col(col_ref(PLAYER_NAME));
            }
            EntityKind::Hero | EntityKind::Game => {
                query.group_by_col(col_ref(GP_HERO_NAME));
            }
        }
        query
    }

    /// Add WHERE conditions from the compiled filter.
    fn add_conditions(&self, query: &mut SelectStatement) {
        for condition in &self.query.filter.conditions {
            query.and_where(condition_expr(condition));
        }
    }

    /// Restrict groups whose display identifier contains the search term.
    fn add_search(&self, query: &mut SelectStatement) {
        let Some(ref term) = self.query.search else {
            return;
        };
        let pattern = format!("%{}%", escape_like_wildcards(term));
        match self.query.entity {
            EntityKind::Player => {
                let cond = Cond::any()
                    .add(Expr::cust_with_values(
                        format!("{}::text LIKE $1", qualified(PLAYER_STEAM_ID)),
                        [pattern.clone()],
                    ))
                    .add(col(PLAYER_NAME).like(pattern));
                query.and_where(cond.into());
            }
            EntityKind::Hero => {
                query.and_where(col(GP_HERO_NAME).like(pattern));
            }
            EntityKind::Game => {}
        }
    }

    /// Add the per-group statistics.
    fn add_aggregates(&self, query: &mut SelectStatement) {
        let gp = |column: &'static str| qualified(StorageRef::new(GAME_PLAYER_TABLE, column));

        for (column, aggregate) in [
            ("kills", Aggregate::Kills),
            ("deaths", Aggregate::Deaths),
            ("assists", Aggregate::Assists),
            ("points", Aggregate::Points),
        ] {
            query.expr_as(
                Expr::cust(format!("AVG({})::float8", gp(column))),
                Alias::new(aggregate.alias()),
            );
        }

        let winner = gp("winner");
        let wins = format!("SUM(CASE WHEN {winner} THEN 1 ELSE 0 END)");
        let losses = format!("SUM(CASE WHEN {winner} THEN 0 ELSE 1 END)");

        query.expr_as(
            Expr::cust(format!("{wins}::bigint")),
            Alias::new(Aggregate::Wins.alias()),
        );
        query.expr_as(
            Expr::cust(format!("{losses}::bigint")),
            Alias::new(Aggregate::Losses.alias()),
        );
        query.expr_as(
            Expr::cust("COUNT(*)::bigint"),
            Alias::new(Aggregate::Games.alias()),
        );
        if self.query.entity == EntityKind::Player {
            query.expr_as(
                Expr::cust(format!("COUNT(DISTINCT {})::bigint", qualified(GP_HERO_NAME))),
                Alias::new(Aggregate::Heroes.alias()),
            );
        }
        query.expr_as(
            Expr::cust(wilson_score_sql(
                &format!("{wins}::float8"),
                &format!("{losses}::float8"),
            )),
            Alias::new(Aggregate::Score.alias()),
        );
    }

    /// Add ORDER BY clauses.
    fn add_ordering(&self, query: &mut SelectStatement) {
        for term in &self.query.ordering.terms {
            let order = match term.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            match term.target {
                SortTarget::Column(storage) => {
                    query.order_by(col_ref(storage), order);
                }
                // Output-column alias; resolves before input columns of the same name.
                SortTarget::Aggregate(aggregate) => {
                    query.order_by(Alias::new(aggregate.alias()), order);
                }
                SortTarget::GroupKey => {
                    if let Some(key) = registry::group_key_column(self.query.entity) {
                        query.order_by(col_ref(key), order);
                    }
                }
            }
        }
    }

    /// LIMIT/OFFSET for pagination.
    fn add_pagination(&self, query: &mut SelectStatement) {
        query.limit(self.query.page.take);
        query.offset(self.query.page.skip);
    }
}

/// Build the SQL expression for one condition.
pub fn condition_expr(condition: &Condition) -> SimpleExpr {
    match condition {
        Condition::Between { column, start, end } => col(*column).between(*start, *end),
        Condition::AtLeast { column, bound } => col(*column).gte(*bound),
        Condition::AtMost { column, bound } => col(*column).lte(*bound),
        Condition::Contains { column, needle } => {
            col(*column).like(format!("%{}%", escape_like_wildcards(needle)))
        }
        Condition::Equals { column, value } => col(*column).eq(*value),
        Condition::ArrayContains { column, element } => Expr::cust_with_values(
            format!("{} @> ARRAY[$1]::text[]", qualified(*column)),
            [element.clone()],
        ),
    }
}

fn col_ref(storage: StorageRef) -> (Alias, Alias) {
    (Alias::new(storage.table), Alias::new(storage.column))
}

fn col(storage: StorageRef) -> Expr {
    Expr::col(col_ref(storage))
}

/// Quoted `"table"."column"` for custom expressions. Names come from the registry only.
fn qualified(storage: StorageRef) -> String {
    format!("\"{}\".\"{}\"", storage.table, storage.column)
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
pub fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
