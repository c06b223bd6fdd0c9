//! Game and participation records.
//!
//! A game is one recorded match; each of its participations (`GamePlayer`)
//! denormalizes the game's mode, date, rankeable flag and ladder names so
//! the ranking aggregate can filter without joining back to `game`.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of connected players a rankeable game must have.
pub const RANKEABLE_PLAYER_COUNT: usize = 9;

/// Stored text of a connected participation state.
pub const PLAYER_STATE_CONNECTED: &str = "CONNECTED";

/// Match mode, stored as its SCREAMING_SNAKE name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    Normal,
    #[serde(rename = "POINT_30")]
    Point30,
    #[serde(rename = "POINT_45")]
    Point45,
    #[serde(rename = "POINT_60")]
    Point60,
}

impl GameMode {
    /// Return the string representation stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Point30 => "POINT_30",
            Self::Point45 => "POINT_45",
            Self::Point60 => "POINT_60",
        }
    }

    /// Shortest duration for a game of this mode to count towards rankings.
    pub fn min_rankeable_seconds(&self) -> i32 {
        match self {
            Self::Normal => 15 * 60,
            Self::Point30 => 25 * 60,
            Self::Point45 => 40 * 60,
            Self::Point60 => 55 * 60,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "POINT_30" => Ok(Self::Point30),
            "POINT_45" => Ok(Self::Point45),
            "POINT_60" => Ok(Self::Point60),
            _ => Err(anyhow::anyhow!("invalid game mode: {s:?}")),
        }
    }
}

/// A player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub steam_id: i64,
    pub name: String,
}

/// A hero, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
}

/// An item held at the end of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
}

/// One player's participation in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayer {
    pub id: i64,
    pub created_date: DateTime<Utc>,
    /// Connection state at the end of the game (e.g. `CONNECTED`).
    pub state: String,
    pub player: Player,
    pub hero: Hero,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub points: i32,
    pub level: i32,
    pub team: String,
    pub winner: bool,
    pub rankeable: bool,
    #[serde(default)]
    pub items: Vec<Item>,
    pub game_mode: GameMode,
    pub hero_selection_mode: String,
    #[serde(default)]
    pub ladder_names: Vec<String>,
}

impl GamePlayer {
    pub fn is_connected(&self) -> bool {
        self.state == PLAYER_STATE_CONNECTED
    }
}

/// A recorded match with its participations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub created_date: DateTime<Utc>,
    pub game_mode: GameMode,
    pub hero_selection_mode: String,
    pub duration_seconds: i32,
    pub winner_team: String,
    pub rankeable: bool,
    pub balance: Option<String>,
    #[serde(default)]
    pub ladder_names: Vec<String>,
    #[serde(default)]
    pub players: Vec<GamePlayer>,
}

impl Game {
    /// Whether this game is eligible for statistics.
    ///
    /// Requires a full lobby of connected players and a duration that meets
    /// the mode's threshold.
    pub fn compute_rankeable(&self) -> bool {
        let connected = self.players.iter().filter(|p| p.is_connected()).count();
        connected == RANKEABLE_PLAYER_COUNT
            && self.duration_seconds >= self.game_mode.min_rankeable_seconds()
    }
}
