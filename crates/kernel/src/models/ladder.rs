//! Ladder summaries.
//!
//! A ladder is a named sub-collection of games. Only the read-only summary
//! is exposed here; creating ladders and assigning games lives elsewhere.

use serde::{Deserialize, Serialize};

/// Ladder name with its game count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LadderSummary {
    pub name: String,
    pub num_games: i64,
}

/// Order ladders by game count, busiest first, then by name.
pub fn sort_ladders(ladders: &mut [LadderSummary]) {
    ladders.sort_by(|a, b| b.num_games.cmp(&a.num_games).then_with(|| a.name.cmp(&b.name)));
}
