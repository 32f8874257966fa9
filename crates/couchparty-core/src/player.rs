use serde::{Deserialize, Serialize};

use crate::physics::Vec2;

/// Connection-scoped identifier. Stable for the lifetime of one WebSocket.
pub type PlayerId = u64;

/// A phone controller registered in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub score: i32,
    pub is_ready: bool,
    /// Spawn hint assigned at round start.
    #[serde(default)]
    pub position: Vec2,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: PlayerColor) -> Self {
        Self {
            id,
            name,
            color,
            score: 0,
            is_ready: false,
            position: Vec2::ZERO,
        }
    }
}

/// Player avatar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// Fixed palette handed out round-robin by join order.
    pub const PALETTE: [PlayerColor; 8] = [
        PlayerColor::rgb(0xFF, 0x6B, 0x6B), // Coral
        PlayerColor::rgb(0x4E, 0xCD, 0xC4), // Teal
        PlayerColor::rgb(0x45, 0xB7, 0xD1), // Sky
        PlayerColor::rgb(0x96, 0xCE, 0xB4), // Sage
        PlayerColor::rgb(0xFF, 0xEA, 0xA7), // Cream
        PlayerColor::rgb(0xDD, 0xA0, 0xDD), // Plum
        PlayerColor::rgb(0x98, 0xD8, 0xC8), // Mint
        PlayerColor::rgb(0xF7, 0xDC, 0x6F), // Gold
    ];

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color for the player joining at zero-based position `join_index`.
    pub fn for_join_index(join_index: usize) -> Self {
        Self::PALETTE[join_index % Self::PALETTE.len()]
    }

    /// CSS-style `#RRGGBB` string.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
