//! Storage backends for list and ranking queries.
//!
//! Both backends consume the same [`CompiledQuery`]:
//! - `PgStatsStore` renders it to SQL and lets PostgreSQL aggregate
//! - `MemoryStore` evaluates it over fixtures held in memory

mod bind;
mod memory;
mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStatsStore;

use crate::models::{Game, LadderSummary};
use crate::query::CompiledQuery;
use crate::ranking::RankingRow;

/// Errors raised while reading statistics.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to games, participations and ladders.
///
/// Page and count methods receive the same compiled query; the count must
/// ignore `query.page` and `query.ordering`.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// One page of games, each with its participations.
    async fn games_page(&self, query: &CompiledQuery) -> StoreResult<Vec<Game>>;

    /// Number of games matching the filter.
    async fn games_count(&self, query: &CompiledQuery) -> StoreResult<u64>;

    /// One page of ranking rows for `query.entity`.
    async fn ranking_page(&self, query: &CompiledQuery) -> StoreResult<Vec<RankingRow>>;

    /// Number of groups matching the filter and search.
    async fn ranking_count(&self, query: &CompiledQuery) -> StoreResult<u64>;

    /// All ladders, busiest first.
    async fn ladders(&self) -> StoreResult<Vec<LadderSummary>>;

    /// Whether the backend is reachable.
    async fn healthy(&self) -> bool;
}
