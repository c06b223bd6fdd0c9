//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::service::StatsService;
use crate::store::{PgStatsStore, StatsStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// List and ranking execution.
    stats: StatsService,

    /// Upper bound applied to `take`.
    max_page_size: u64,
}

impl AppState {
    /// Connect to PostgreSQL and build the state.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        info!(
            max_connections = config.database_max_connections,
            "connected to PostgreSQL"
        );

        Ok(Self::with_store(
            Arc::new(PgStatsStore::new(pool)),
            config.query_timeout,
            config.max_page_size,
        ))
    }

    /// Build the state over any store.
    pub fn with_store(
        store: Arc<dyn StatsStore>,
        query_timeout: Duration,
        max_page_size: u64,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                stats: StatsService::new(store, query_timeout),
                max_page_size,
            }),
        }
    }

    /// Get the statistics service.
    pub fn stats(&self) -> &StatsService {
        &self.inner.stats
    }

    pub fn max_page_size(&self) -> u64 {
        self.inner.max_page_size
    }
}
