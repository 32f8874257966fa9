use serde::{Deserialize, Serialize};

use crate::physics::{Vec2, sanitize_axis};
use crate::player::{Player, PlayerId};
use crate::ranking::RankedEntry;
use crate::session::{GameKind, SessionSnapshot};

/// Network message type discriminator (first byte of every frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Connection -> Server
    Join = 0x01,
    ReadyToggle = 0x02,
    Input = 0x03,
    Tilt = 0x04,
    Action = 0x05,
    DisplayJoin = 0x06,
    StartRound = 0x07,
    ScoreUpdate = 0x08,
    VibrateRequest = 0x09,
    EndRound = 0x0A,
    ReturnToLobby = 0x0B,

    // Server -> Connection
    Joined = 0x10,
    JoinRejected = 0x11,
    Roster = 0x12,
    SessionState = 0x13,
    AllReady = 0x14,
    PlayerInput = 0x15,
    PlayerTilt = 0x16,
    PlayerAction = 0x17,
    RoundStarted = 0x18,
    Score = 0x19,
    Vibrate = 0x1A,
    RoundEnded = 0x1B,
    ReturnedToLobby = 0x1C,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0x01 => Self::Join,
            0x02 => Self::ReadyToggle,
            0x03 => Self::Input,
            0x04 => Self::Tilt,
            0x05 => Self::Action,
            0x06 => Self::DisplayJoin,
            0x07 => Self::StartRound,
            0x08 => Self::ScoreUpdate,
            0x09 => Self::VibrateRequest,
            0x0A => Self::EndRound,
            0x0B => Self::ReturnToLobby,
            0x10 => Self::Joined,
            0x11 => Self::JoinRejected,
            0x12 => Self::Roster,
            0x13 => Self::SessionState,
            0x14 => Self::AllReady,
            0x15 => Self::PlayerInput,
            0x16 => Self::PlayerTilt,
            0x17 => Self::PlayerAction,
            0x18 => Self::RoundStarted,
            0x19 => Self::Score,
            0x1A => Self::Vibrate,
            0x1B => Self::RoundEnded,
            0x1C => Self::ReturnedToLobby,
            _ => return None,
        })
    }
}

/// Everything a connection (phone or display) may send to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join(JoinMsg),
    ReadyToggle,
    Input(InputMsg),
    Tilt(TiltMsg),
    Action(ActionMsg),
    DisplayJoin,
    StartRound(StartRoundMsg),
    ScoreUpdate(ScoreUpdateMsg),
    Vibrate(VibrateRequestMsg),
    EndRound(RoundResultsMsg),
    ReturnToLobby,
}

/// Everything the server may send to a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Joined(Player),
    JoinRejected(JoinRejectedMsg),
    Roster(RosterMsg),
    SessionState(SessionSnapshot),
    AllReady,
    PlayerInput(RelayedInputMsg),
    PlayerTilt(RelayedTiltMsg),
    PlayerAction(RelayedActionMsg),
    RoundStarted(RoundStartedMsg),
    Score(ScoreMsg),
    Vibrate(VibrateMsg),
    RoundEnded(RoundResultsMsg),
    ReturnedToLobby,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinMsg {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRejectedMsg {
    pub reason: String,
}

/// Virtual joystick vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputMsg {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub action: bool,
}

impl InputMsg {
    pub fn vector(&self) -> Vec2 {
        Vec2::new(sanitize_axis(self.x), sanitize_axis(self.y))
    }
}

/// Device tilt vector, each axis in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltMsg {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Degrees of tilt that map to full deflection.
pub const TILT_FULL_SCALE_DEG: f32 = 30.0;

impl TiltMsg {
    /// Map device orientation angles (front-back `beta`, left-right `gamma`)
    /// to a clamped tilt vector.
    pub fn from_orientation(beta: f32, gamma: f32) -> Self {
        Self {
            x: sanitize_axis(gamma / TILT_FULL_SCALE_DEG),
            y: sanitize_axis(beta / TILT_FULL_SCALE_DEG),
        }
    }

    pub fn vector(&self) -> Vec2 {
        Vec2::new(sanitize_axis(self.x), sanitize_axis(self.y))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Boost,
    Attack,
    Special,
    Answer,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Button press from a controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMsg {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    #[serde(default)]
    pub answer: Option<String>,
}

impl ActionMsg {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, answer: None }
    }

    pub fn answer(letter: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Answer,
            answer: Some(letter.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRoundMsg {
    pub game: GameKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdateMsg {
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default)]
    pub score: i32,
}

/// Default vibration when a request carries no pattern.
pub const DEFAULT_VIBRATION_MS: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrateRequestMsg {
    #[serde(default)]
    pub player_id: PlayerId,
    #[serde(default)]
    pub pattern: Vec<u32>,
}

/// Final ranking of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResultsMsg {
    pub game: Option<GameKind>,
    #[serde(default)]
    pub results: Vec<RankedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMsg {
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelayedInputMsg {
    pub player_id: PlayerId,
    pub input: InputMsg,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelayedTiltMsg {
    pub player_id: PlayerId,
    pub tilt: TiltMsg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayedActionMsg {
    pub player_id: PlayerId,
    pub action: ActionMsg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStartedMsg {
    pub game: GameKind,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMsg {
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrateMsg {
    pub pattern: Vec<u32>,
}
