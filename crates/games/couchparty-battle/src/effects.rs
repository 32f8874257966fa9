use serde::{Deserialize, Serialize};

use couchparty_core::physics::Vec2;
use couchparty_core::player::PlayerColor;

pub const EFFECT_START_RADIUS: f32 = 20.0;
pub const EFFECT_GROWTH_PER_TICK: f32 = 8.0;
pub const EFFECT_LIFE_TICKS: u32 = 10;

/// Expanding shockwave drawn where an attack landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEffect {
    pub origin: Vec2,
    pub radius: f32,
    pub life: u32,
    pub color: PlayerColor,
}

impl BattleEffect {
    pub fn new(origin: Vec2, color: PlayerColor) -> Self {
        Self {
            origin,
            radius: EFFECT_START_RADIUS,
            life: EFFECT_LIFE_TICKS,
            color,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.life as f32 / EFFECT_LIFE_TICKS as f32
    }

    /// Grow and age by one tick. Returns false once expired.
    pub fn step(&mut self) -> bool {
        self.radius += EFFECT_GROWTH_PER_TICK;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

pub fn step_effects(effects: &mut Vec<BattleEffect>) {
    effects.retain_mut(BattleEffect::step);
}
