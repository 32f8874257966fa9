use couchparty_core::net::protocol::ProtocolError;
use couchparty_core::session::{GameKind, GamePhase};
use tokio_tungstenite::tungstenite;

use crate::round::RoundId;

/// Round controller transition failures. None of these are fatal; the
/// runtime logs them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// The game kind is not compiled into this display.
    UnknownGame(GameKind),
    RoundInProgress(RoundId),
    NoActiveRound,
    /// Nobody is in the lobby to play.
    NoPlayers,
    InvalidPhase {
        phase: GamePhase,
        action: &'static str,
    },
}

impl std::fmt::Display for RoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownGame(kind) => write!(f, "game {kind} is not available on this display"),
            Self::RoundInProgress(id) => write!(f, "round {id} is still running"),
            Self::NoActiveRound => write!(f, "no round is running"),
            Self::NoPlayers => write!(f, "no players have joined"),
            Self::InvalidPhase { phase, action } => {
                write!(f, "cannot {action} while in {phase:?}")
            },
        }
    }
}

impl std::error::Error for RoundError {}

/// Errors that end the display runtime.
#[derive(Debug)]
pub enum DisplayError {
    Config(String),
    Connect(tungstenite::Error),
    Socket(tungstenite::Error),
    Protocol(ProtocolError),
    /// The server closed the WebSocket.
    Closed,
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Connect(e) => write!(f, "cannot connect to server: {e}"),
            Self::Socket(e) => write!(f, "websocket error: {e}"),
            Self::Protocol(e) => write!(f, "protocol error: {e}"),
            Self::Closed => write!(f, "server closed the connection"),
        }
    }
}

impl std::error::Error for DisplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) | Self::Socket(e) => Some(e),
            Self::Protocol(e) => Some(e),
            Self::Config(_) | Self::Closed => None,
        }
    }
}

impl From<ProtocolError> for DisplayError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}
