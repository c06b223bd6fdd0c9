//! Statistics service.
//!
//! Compiles each request once and runs the page and count reads against
//! the same compiled query, concurrently and under one timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::models::{Game, LadderSummary};
use crate::query::{CompiledQuery, EntityKind, ListRequest, PageResult, compile};
use crate::ranking::RankingRow;
use crate::store::{StatsStore, StoreError, StoreResult};

/// Executes list and ranking requests against a [`StatsStore`].
pub struct StatsService {
    store: Arc<dyn StatsStore>,
    query_timeout: Duration,
}

impl StatsService {
    pub fn new(store: Arc<dyn StatsStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    /// One page of games with the total number of matching games.
    pub async fn list_games(&self, request: &ListRequest) -> StoreResult<PageResult<Game>> {
        let query = Self::compile(EntityKind::Game, request);
        let (rows, total_count) = self
            .with_timeout(async {
                tokio::try_join!(self.store.games_page(&query), self.store.games_count(&query))
            })
            .await?;
        Ok(PageResult::new(rows, total_count))
    }

    /// Per-player leaderboard page.
    pub async fn rank_players(&self, request: &ListRequest) -> StoreResult<PageResult<RankingRow>> {
        self.rank(EntityKind::Player, request).await
    }

    /// Per-hero leaderboard page.
    pub async fn rank_heroes(&self, request: &ListRequest) -> StoreResult<PageResult<RankingRow>> {
        self.rank(EntityKind::Hero, request).await
    }

    async fn rank(
        &self,
        entity: EntityKind,
        request: &ListRequest,
    ) -> StoreResult<PageResult<RankingRow>> {
        let query = Self::compile(entity, request);
        let (rows, total_count) = self
            .with_timeout(async {
                tokio::try_join!(
                    self.store.ranking_page(&query),
                    self.store.ranking_count(&query)
                )
            })
            .await?;
        Ok(PageResult::new(rows, total_count))
    }

    /// All ladders, busiest first.
    pub async fn ladders(&self) -> StoreResult<Vec<LadderSummary>> {
        self.with_timeout(self.store.ladders()).await
    }

    pub async fn healthy(&self) -> bool {
        self.store.healthy().await
    }

    fn compile(entity: EntityKind, request: &ListRequest) -> CompiledQuery {
        let query = compile(entity, request);
        debug!(
            entity = ?entity,
            conditions = query.filter.conditions.len(),
            default_group = query.filter.is_default_group_sentinel,
            explicit_sort = query.ordering.had_any_sort,
            take = query.page.take,
            skip = query.page.skip,
            "compiled query"
        );
        query
    }

    async fn with_timeout<T, F>(&self, future: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.query_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.query_timeout, "statistics query timed out");
                Err(StoreError::Timeout(self.query_timeout))
            }
        }
    }
}
