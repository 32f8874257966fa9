use serde::{Deserialize, Serialize};

use crate::player::Player;

/// The three mini-games a display can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Racing,
    Battle,
    Quiz,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Racing, GameKind::Battle, GameKind::Quiz];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Racing => "racing",
            Self::Battle => "battle",
            Self::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "racing" => Ok(Self::Racing),
            "battle" => Ok(Self::Battle),
            "quiz" => Ok(Self::Quiz),
            other => Err(format!("unknown game: {other}")),
        }
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Lobby,
    Playing,
    Results,
}

/// Global session limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub max_players: usize,
    pub round_duration_secs: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            round_duration_secs: 60,
        }
    }
}

/// Read-only view of the session, served to displays and `/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub players: Vec<Player>,
    pub current_game: Option<GameKind>,
    pub phase: GamePhase,
    pub round_duration_secs: u32,
}
