//! Match statistics kernel library.
//!
//! Game listing and player/hero leaderboards over recorded matches.
//! The main entry point for running the server is the `matchstats` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod ranking;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::Config;
pub use state::AppState;
