//! Ranking aggregator.
//!
//! - score: Wilson lower bound, in Rust and as SQL
//! - aggregate: in-process grouping and ordering of participations

pub mod aggregate;
pub mod score;

pub use aggregate::{AggregateStats, GroupKey, RankingRow, aggregate, compare_nulls_last, sort_rows};
pub use score::{wilson_score, wilson_score_sql};
