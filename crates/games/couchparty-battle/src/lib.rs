pub mod combat;
pub mod effects;

use std::collections::HashMap;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use couchparty_core::game_trait::{GameEvent, GameMetadata, MiniGame, Motion};
use couchparty_core::mini_game_boilerplate;
use couchparty_core::net::messages::{ActionKind, ActionMsg};
use couchparty_core::physics::{Body, PlayField, Vec2, start_positions};
use couchparty_core::player::{Player, PlayerColor, PlayerId};
use couchparty_core::render::{Frame, Shape, draw_player};
use couchparty_core::session::GameKind;

use combat::{
    ATTACK_DAMAGE, HIT_POINTS, HIT_VIBRATION_MS, KNOCKOUT_BONUS, MAX_HEALTH, REGEN_PER_TICK,
    cooldown_elapsed, knockback, resolve_hits, respawn_point,
};
use effects::{BattleEffect, step_effects};

pub const FRICTION: f32 = 0.9;
pub const ARENA_MARGIN: f32 = 40.0;

const HEALTH_GOOD: PlayerColor = PlayerColor::rgb(0x00, 0xFF, 0x00);
const HEALTH_LOW: PlayerColor = PlayerColor::rgb(0xFF, 0xFF, 0x00);
const HEALTH_CRITICAL: PlayerColor = PlayerColor::rgb(0xFF, 0x00, 0x00);

/// Serializable battle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    pub fighters: HashMap<PlayerId, Fighter>,
    pub scores: HashMap<PlayerId, i32>,
    pub effects: Vec<BattleEffect>,
    pub field: PlayField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub name: String,
    pub color: PlayerColor,
    pub body: Body,
    pub health: f32,
    pub max_health: f32,
}

/// Free-for-all shockwave brawl.
pub struct BattleArena {
    state: BattleState,
    player_ids: Vec<PlayerId>,
    pending_motion: HashMap<PlayerId, Motion>,
    last_attack: HashMap<PlayerId, Instant>,
    rng: StdRng,
}

impl BattleArena {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic respawns for replays and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: BattleState {
                fighters: HashMap::new(),
                scores: HashMap::new(),
                effects: Vec::new(),
                field: PlayField::default(),
            },
            player_ids: Vec::new(),
            pending_motion: HashMap::new(),
            last_attack: HashMap::new(),
            rng,
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    fn attack(&mut self, attacker_id: PlayerId, now: Instant) -> Vec<GameEvent> {
        let Some(attacker) = self.state.fighters.get(&attacker_id) else {
            return Vec::new();
        };
        if !cooldown_elapsed(self.last_attack.get(&attacker_id).copied(), now) {
            return Vec::new();
        }
        self.last_attack.insert(attacker_id, now);

        let origin = attacker.body.pos;
        self.state
            .effects
            .push(BattleEffect::new(origin, attacker.color));

        let hits = resolve_hits(
            attacker_id,
            origin,
            self.player_ids
                .iter()
                .filter_map(|id| self.state.fighters.get(id).map(|f| (*id, f.body.pos))),
        );

        let mut events = Vec::new();
        for hit in hits {
            let Some(target) = self.state.fighters.get_mut(&hit.target) else {
                continue;
            };
            target.health -= ATTACK_DAMAGE;
            target.body.vel += knockback(hit.angle);
            events.push(GameEvent::Vibrate {
                player_id: hit.target,
                pattern: HIT_VIBRATION_MS.to_vec(),
            });

            let mut gained = HIT_POINTS;
            if target.health <= 0.0 {
                target.health = target.max_health;
                target.body.pos = respawn_point(&mut self.rng, &self.state.field, ARENA_MARGIN);
                target.body.vel = Vec2::ZERO;
                gained += KNOCKOUT_BONUS;
                tracing::debug!(
                    attacker = attacker_id,
                    target = hit.target,
                    "Fighter knocked out"
                );
            }

            let score = self.state.scores.entry(attacker_id).or_insert(0);
            *score += gained;
            events.push(GameEvent::ScoreChanged {
                player_id: attacker_id,
                score: *score,
            });
        }
        events
    }
}

impl Default for BattleArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for BattleArena {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            kind: GameKind::Battle,
            title: "Battle Arena".to_string(),
            description: "Move in close and attack to knock out the other players.".to_string(),
        }
    }

    fn init(&mut self, players: &[Player], field: &PlayField) {
        self.state = BattleState {
            fighters: HashMap::new(),
            scores: HashMap::new(),
            effects: Vec::new(),
            field: *field,
        };
        self.player_ids.clear();
        self.pending_motion.clear();
        self.last_attack.clear();

        let starts = start_positions(players.len(), field);
        for (player, start) in players.iter().zip(starts) {
            self.player_ids.push(player.id);
            self.state.fighters.insert(
                player.id,
                Fighter {
                    name: player.name.clone(),
                    color: player.color,
                    body: Body::at(start),
                    health: MAX_HEALTH,
                    max_health: MAX_HEALTH,
                },
            );
            self.state.scores.insert(player.id, 0);
        }
    }

    fn apply_motion(&mut self, player_id: PlayerId, motion: Motion) {
        if self.state.fighters.contains_key(&player_id) {
            self.pending_motion.insert(player_id, motion);
        }
    }

    fn apply_action(
        &mut self,
        player_id: PlayerId,
        action: &ActionMsg,
        now: Instant,
    ) -> Vec<GameEvent> {
        match action.kind {
            ActionKind::Attack => self.attack(player_id, now),
            _ => Vec::new(),
        }
    }

    fn update(&mut self, _now: Instant) -> Vec<GameEvent> {
        for pid in &self.player_ids {
            let Some(fighter) = self.state.fighters.get_mut(pid) else {
                continue;
            };
            if let Some(Motion::Tilt(dir) | Motion::Stick(dir)) = self.pending_motion.remove(pid) {
                fighter.body.steer(dir, 1.0);
            }
            fighter.body.advance(FRICTION, &self.state.field, ARENA_MARGIN);
            if fighter.health < fighter.max_health {
                fighter.health = (fighter.health + REGEN_PER_TICK).min(fighter.max_health);
            }
        }
        step_effects(&mut self.state.effects);
        Vec::new()
    }

    fn player_left(&mut self, player_id: PlayerId) {
        self.player_ids.retain(|&id| id != player_id);
        self.state.fighters.remove(&player_id);
        self.state.scores.remove(&player_id);
        self.pending_motion.remove(&player_id);
        self.last_attack.remove(&player_id);
    }

    fn render(&self, frame: &mut Frame) {
        frame.title = self.metadata().title;
        for effect in &self.state.effects {
            frame.push(Shape::Ring {
                center: effect.origin,
                radius: effect.radius,
                color: effect.color,
                alpha: effect.alpha(),
            });
        }
        for pid in &self.player_ids {
            let Some(fighter) = self.state.fighters.get(pid) else {
                continue;
            };
            let radius = fighter.body.radius();
            draw_player(frame, fighter.body.pos, radius, fighter.color, &fighter.name);

            let fill = (fighter.health / fighter.max_health).clamp(0.0, 1.0);
            let color = if fill > 0.5 {
                HEALTH_GOOD
            } else if fill > 0.25 {
                HEALTH_LOW
            } else {
                HEALTH_CRITICAL
            };
            frame.push(Shape::Gauge {
                at: Vec2::new(fighter.body.pos.x - 25.0, fighter.body.pos.y - radius - 15.0),
                width: 50.0,
                fill,
                color,
            });
            frame.hud_line(format!(
                "{}: {:.0} hp / {} pts",
                fighter.name,
                fighter.health,
                self.state.scores.get(pid).copied().unwrap_or(0)
            ));
        }
    }

    mini_game_boilerplate!();
}
