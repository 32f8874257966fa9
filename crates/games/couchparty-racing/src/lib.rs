pub mod track;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use couchparty_core::game_trait::{GameEvent, GameMetadata, MiniGame, Motion};
use couchparty_core::mini_game_boilerplate;
use couchparty_core::net::messages::{ActionKind, ActionMsg};
use couchparty_core::physics::{Body, PlayField, start_positions};
use couchparty_core::player::{Player, PlayerColor, PlayerId};
use couchparty_core::render::{Frame, Shape, WHITE, draw_player};
use couchparty_core::session::GameKind;

use track::{Capture, Track};

/// Per-tick velocity decay.
pub const FRICTION: f32 = 0.95;
pub const WALL_MARGIN: f32 = 30.0;
pub const BOOST_DURATION: Duration = Duration::from_millis(500);
pub const BOOST_MULTIPLIER: f32 = 2.0;
pub const CHECKPOINT_POINTS: i32 = 10;
pub const LAP_BONUS: i32 = 100;

const TRACK_COLOR: PlayerColor = PlayerColor::rgb(0x00, 0xFF, 0xFF);

/// Serializable racing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RacingState {
    pub racers: HashMap<PlayerId, Racer>,
    pub scores: HashMap<PlayerId, i32>,
    pub track: Track,
    pub field: PlayField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Racer {
    pub name: String,
    pub color: PlayerColor,
    pub body: Body,
    pub boosting: bool,
    pub current_checkpoint: usize,
    pub laps: u32,
}

/// Tilt-steered checkpoint race.
pub struct TiltRacing {
    state: RacingState,
    player_ids: Vec<PlayerId>,
    pending_motion: HashMap<PlayerId, Motion>,
    boost_until: HashMap<PlayerId, Instant>,
}

impl TiltRacing {
    pub fn new() -> Self {
        let field = PlayField::default();
        Self {
            state: RacingState {
                racers: HashMap::new(),
                scores: HashMap::new(),
                track: Track::for_field(&field),
                field,
            },
            player_ids: Vec::new(),
            pending_motion: HashMap::new(),
            boost_until: HashMap::new(),
        }
    }

    pub fn state(&self) -> &RacingState {
        &self.state
    }

    fn is_boosting(&self, player_id: PlayerId, now: Instant) -> bool {
        self.boost_until
            .get(&player_id)
            .is_some_and(|&until| now < until)
    }
}

impl Default for TiltRacing {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for TiltRacing {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            kind: GameKind::Racing,
            title: "Tilt Racing".to_string(),
            description: "Tilt to steer through the checkpoints in order. Boost for speed!"
                .to_string(),
        }
    }

    fn init(&mut self, players: &[Player], field: &PlayField) {
        self.state = RacingState {
            racers: HashMap::new(),
            scores: HashMap::new(),
            track: Track::for_field(field),
            field: *field,
        };
        self.player_ids.clear();
        self.pending_motion.clear();
        self.boost_until.clear();

        let starts = start_positions(players.len(), field);
        for (player, start) in players.iter().zip(starts) {
            self.player_ids.push(player.id);
            self.state.racers.insert(
                player.id,
                Racer {
                    name: player.name.clone(),
                    color: player.color,
                    body: Body::at(start),
                    boosting: false,
                    current_checkpoint: 0,
                    laps: 0,
                },
            );
            self.state.scores.insert(player.id, 0);
        }
    }

    fn apply_motion(&mut self, player_id: PlayerId, motion: Motion) {
        if self.state.racers.contains_key(&player_id) {
            self.pending_motion.insert(player_id, motion);
        }
    }

    fn apply_action(
        &mut self,
        player_id: PlayerId,
        action: &ActionMsg,
        now: Instant,
    ) -> Vec<GameEvent> {
        if action.kind == ActionKind::Boost && self.state.racers.contains_key(&player_id) {
            self.boost_until.insert(player_id, now + BOOST_DURATION);
        }
        Vec::new()
    }

    fn update(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for i in 0..self.player_ids.len() {
            let pid = self.player_ids[i];
            let boosting = self.is_boosting(pid, now);
            let Some(racer) = self.state.racers.get_mut(&pid) else {
                continue;
            };
            racer.boosting = boosting;

            match self.pending_motion.remove(&pid) {
                Some(Motion::Tilt(dir)) => {
                    let mult = if boosting { BOOST_MULTIPLIER } else { 1.0 };
                    racer.body.steer(dir, mult);
                },
                Some(Motion::Stick(dir)) => racer.body.steer(dir, 1.0),
                None => {},
            }

            racer.body.advance(FRICTION, &self.state.field, WALL_MARGIN);

            let radius = racer.body.radius();
            let gained = match self.state.track.try_capture(
                &mut racer.current_checkpoint,
                &mut racer.laps,
                racer.body.pos,
                radius,
            ) {
                Some(Capture::Checkpoint) => CHECKPOINT_POINTS,
                Some(Capture::Lap) => {
                    tracing::debug!(player_id = pid, laps = racer.laps, "Lap completed");
                    CHECKPOINT_POINTS + LAP_BONUS
                },
                None => continue,
            };

            let score = self.state.scores.entry(pid).or_insert(0);
            *score += gained;
            events.push(GameEvent::ScoreChanged {
                player_id: pid,
                score: *score,
            });
        }

        events
    }

    fn player_left(&mut self, player_id: PlayerId) {
        self.player_ids.retain(|&id| id != player_id);
        self.state.racers.remove(&player_id);
        self.state.scores.remove(&player_id);
        self.pending_motion.remove(&player_id);
        self.boost_until.remove(&player_id);
    }

    fn render(&self, frame: &mut Frame) {
        frame.title = self.metadata().title;
        let track = &self.state.track;
        frame.push(Shape::Ring {
            center: track.center,
            radius: track.radius,
            color: WHITE,
            alpha: 0.2,
        });
        for cp in &track.checkpoints {
            frame.push(Shape::Disc {
                center: cp.pos,
                radius: cp.radius,
                color: TRACK_COLOR,
                alpha: 0.3,
            });
            frame.push(Shape::Label {
                at: cp.pos,
                text: (cp.index + 1).to_string(),
                color: WHITE,
            });
        }
        for pid in &self.player_ids {
            let Some(racer) = self.state.racers.get(pid) else {
                continue;
            };
            if racer.boosting {
                frame.push(Shape::Ring {
                    center: racer.body.pos,
                    radius: racer.body.radius() + 8.0,
                    color: racer.color,
                    alpha: 0.6,
                });
            }
            draw_player(
                frame,
                racer.body.pos,
                racer.body.radius(),
                racer.color,
                &racer.name,
            );
            frame.hud_line(format!(
                "{}: lap {} / next {} / {} pts",
                racer.name,
                racer.laps,
                racer.current_checkpoint + 1,
                self.state.scores.get(pid).copied().unwrap_or(0)
            ));
        }
    }

    mini_game_boilerplate!();
}
