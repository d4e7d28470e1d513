use serde::{Deserialize, Serialize};
use std::fmt;

/// Side the tracked player occupied in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    White,
    Black,
}

/// Outcome from the tracked player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Unknown,
}

impl Speed {
    /// Named speeds in event-description match priority.
    pub const NAMED: [Speed; 4] = [Speed::Bullet, Speed::Blitz, Speed::Rapid, Speed::Classical];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Classical => "classical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal used for `timeControl` and `opponent` when the source tag is missing.
pub const UNKNOWN: &str = "unknown";

/// One normalized game, expressed from the tracked player's perspective.
///
/// Field names serialize in camelCase and form the stable downstream schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessGame {
    pub id: String,
    pub rated: bool,
    pub time_control: String,
    pub speed: Speed,
    pub color: Color,
    pub result: GameResult,
    pub opponent: String,
    #[serde(default)]
    pub player_rating: Option<u32>,
    #[serde(default)]
    pub opponent_rating: Option<u32>,
    #[serde(default)]
    pub opening: Option<String>,
    pub pgn: String,
    #[serde(default)]
    pub started_at: Option<String>,
}

impl ChessGame {
    /// Number of optional or defaultable fields carrying real data.
    ///
    /// Used when choosing between two records of the same game.
    pub fn completeness(&self) -> usize {
        [
            self.time_control != UNKNOWN,
            self.speed != Speed::Unknown,
            self.result != GameResult::Unknown,
            self.opponent != UNKNOWN,
            self.player_rating.is_some(),
            self.opponent_rating.is_some(),
            self.opening.is_some(),
            self.started_at.is_some(),
        ]
        .into_iter()
        .filter(|known| *known)
        .count()
    }
}

/// Games for one tracked player on one site, conventionally most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBatch {
    pub player: String,
    pub site: String,
    #[serde(default)]
    pub games: Vec<ChessGame>,
}

impl GameBatch {
    pub fn new(player: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            site: site.into(),
            games: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
