//! Match statistics test utilities.
//!
//! Helpers for integration testing: game and participation fixtures,
//! builders for win/loss records, and JSON assertion helpers.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Timestamp of the first fixture game.
pub fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Create a rankeable `POINT_45` test game played `id` hours after [`base_date`].
pub fn test_game(id: i64) -> TestGame {
    TestGame {
        id,
        created_date: base_date() + Duration::hours(id),
        game_mode: "POINT_45".to_string(),
        hero_selection_mode: "ALL_PICK".to_string(),
        duration_seconds: 45 * 60,
        winner_team: "TEAM_1".to_string(),
        rankeable: true,
        balance: None,
        ladder_names: Vec::new(),
        players: Vec::new(),
    }
}

/// A test game builder.
#[derive(Debug, Clone)]
pub struct TestGame {
    pub id: i64,
    pub created_date: DateTime<Utc>,
    /// Stored mode text, e.g. `POINT_45`.
    pub game_mode: String,
    pub hero_selection_mode: String,
    pub duration_seconds: i32,
    pub winner_team: String,
    pub rankeable: bool,
    pub balance: Option<String>,
    pub ladder_names: Vec<String>,
    pub players: Vec<TestParticipation>,
}

impl TestGame {
    /// Set the stored mode text.
    pub fn with_mode(mut self, game_mode: &str) -> Self {
        self.game_mode = game_mode.to_string();
        self
    }

    /// Set the creation date.
    pub fn with_created_date(mut self, created_date: DateTime<Utc>) -> Self {
        self.created_date = created_date;
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, seconds: i32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Set the balance version.
    pub fn with_balance(mut self, balance: &str) -> Self {
        self.balance = Some(balance.to_string());
        self
    }

    /// Add the game to a ladder.
    pub fn in_ladder(mut self, name: &str) -> Self {
        self.ladder_names.push(name.to_string());
        self
    }

    /// Mark as not rankeable.
    pub fn unranked(mut self) -> Self {
        self.rankeable = false;
        self
    }

    /// Add a participation.
    pub fn with_player(mut self, player: TestParticipation) -> Self {
        self.players.push(player);
        self
    }
}

/// Create a connected, losing participation with neutral statistics.
pub fn test_participation(steam_id: i64, hero_name: &str) -> TestParticipation {
    TestParticipation {
        steam_id,
        player_name: format!("player{steam_id}"),
        hero_name: hero_name.to_string(),
        state: "CONNECTED".to_string(),
        kills: 0,
        deaths: 0,
        assists: 0,
        points: 0,
        level: 1,
        team: "TEAM_2".to_string(),
        winner: false,
        items: Vec::new(),
    }
}

/// A participation builder. Date, mode and ladders come from the game.
#[derive(Debug, Clone)]
pub struct TestParticipation {
    pub steam_id: i64,
    pub player_name: String,
    pub hero_name: String,
    pub state: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub points: i32,
    pub level: i32,
    pub team: String,
    pub winner: bool,
    pub items: Vec<String>,
}

impl TestParticipation {
    /// Set the player name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.player_name = name.to_string();
        self
    }

    /// Mark as a win.
    pub fn won(mut self) -> Self {
        self.winner = true;
        self.team = "TEAM_1".to_string();
        self
    }

    /// Mark as a loss.
    pub fn lost(mut self) -> Self {
        self.winner = false;
        self.team = "TEAM_2".to_string();
        self
    }

    /// Set kills, deaths, assists and points.
    pub fn with_stats(mut self, kills: i32, deaths: i32, assists: i32, points: i32) -> Self {
        self.kills = kills;
        self.deaths = deaths;
        self.assists = assists;
        self.points = points;
        self
    }

    /// Add an item.
    pub fn with_item(mut self, name: &str) -> Self {
        self.items.push(name.to_string());
        self
    }

    /// Mark as disconnected.
    pub fn disconnected(mut self) -> Self {
        self.state = "DISCONNECTED".to_string();
        self
    }
}

/// One game per result for a single player, numbered from `first_id`.
///
/// `wins` games are won, then `losses` games are lost.
pub fn record(first_id: i64, steam_id: i64, hero_name: &str, wins: u32, losses: u32) -> Vec<TestGame> {
    let results = std::iter::repeat_n(true, wins as usize)
        .chain(std::iter::repeat_n(false, losses as usize));

    results
        .zip(first_id..)
        .map(|(won, id)| {
            let player = test_participation(steam_id, hero_name);
            let player = if won { player.won() } else { player.lost() };
            test_game(id).with_player(player)
        })
        .collect()
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON array under `key` has `len` entries.
    pub fn array_len(value: &Value, key: &str, len: usize) {
        let actual = value.get(key).and_then(Value::as_array).map(Vec::len);
        assert_eq!(
            actual,
            Some(len),
            "Expected '{key}' to be an array of {len}, got: {value}"
        );
    }

    /// Assert the `count` field of a list envelope.
    pub fn count(value: &Value, expected: u64) {
        assert_eq!(
            value.get("count").and_then(Value::as_u64),
            Some(expected),
            "Expected count {expected}, got: {value}"
        );
    }
}
