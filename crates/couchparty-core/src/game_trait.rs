use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::net::messages::ActionMsg;
use crate::physics::{PlayField, Vec2};
use crate::player::{Player, PlayerId};
use crate::render::Frame;
use crate::session::GameKind;

/// Core trait every mini-game rule set implements.
///
/// The display runtime owns networking, the round countdown and the roster;
/// a game only simulates its objects. Every method taking a player id must
/// ignore ids it does not track, since relayed input can race a disconnect
/// or the end of a round.
pub trait MiniGame: Send {
    fn metadata(&self) -> GameMetadata;

    /// Build fresh game objects for every player. Called once per round.
    fn init(&mut self, players: &[Player], field: &PlayField);

    /// Buffer the latest controller vector; consumed on the next `update`.
    fn apply_motion(&mut self, player_id: PlayerId, motion: Motion);

    /// React to a button press immediately. `now` is monotonic wall-clock time.
    fn apply_action(
        &mut self,
        player_id: PlayerId,
        action: &ActionMsg,
        now: Instant,
    ) -> Vec<GameEvent>;

    /// Advance one simulation tick.
    fn update(&mut self, now: Instant) -> Vec<GameEvent>;

    fn player_left(&mut self, player_id: PlayerId);

    /// Current scores in roster order.
    fn scores(&self) -> Vec<PlayerScore>;

    fn render(&self, frame: &mut Frame);

    /// Serialize the simulation state (diagnostics and state-change checks).
    fn serialize_state(&self) -> Vec<u8>;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub kind: GameKind,
    pub title: String,
    pub description: String,
}

/// A buffered controller vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Device tilt; eligible for boost.
    Tilt(Vec2),
    /// On-screen joystick.
    Stick(Vec2),
}

/// Side effects a game asks the runtime to push to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { player_id: PlayerId, score: i32 },
    Vibrate { player_id: PlayerId, pattern: Vec<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: i32,
}

/// Generates `serialize_state` and `scores` for games that keep a
/// serializable `state` with a `scores: HashMap<PlayerId, i32>` field and a
/// roster-ordered `player_ids: Vec<PlayerId>`.
#[macro_export]
macro_rules! mini_game_boilerplate {
    () => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec_named(&self.state).unwrap_or_default()
        }

        fn scores(&self) -> Vec<$crate::game_trait::PlayerScore> {
            self.player_ids
                .iter()
                .map(|&player_id| $crate::game_trait::PlayerScore {
                    player_id,
                    score: self.state.scores.get(&player_id).copied().unwrap_or(0),
                })
                .collect()
        }
    };
}
