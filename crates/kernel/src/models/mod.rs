//! Domain records.

pub mod game;
pub mod ladder;

pub use game::{Game, GameMode, GamePlayer, Hero, Item, Player};
pub use ladder::LadderSummary;
