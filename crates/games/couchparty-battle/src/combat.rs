use std::time::{Duration, Instant};

use rand::Rng;
use smallvec::SmallVec;

use couchparty_core::physics::{PlayField, Vec2};
use couchparty_core::player::PlayerId;

pub const MAX_HEALTH: f32 = 100.0;
pub const REGEN_PER_TICK: f32 = 0.05;
pub const ATTACK_RADIUS: f32 = 80.0;
pub const ATTACK_DAMAGE: f32 = 25.0;
pub const ATTACK_COOLDOWN: Duration = Duration::from_millis(300);
pub const KNOCKBACK: f32 = 20.0;
pub const HIT_POINTS: i32 = 25;
pub const KNOCKOUT_BONUS: i32 = 100;
pub const HIT_VIBRATION_MS: [u32; 3] = [100, 50, 100];
/// Max offset per axis from the field center when respawning.
pub const RESPAWN_SPREAD: f32 = 150.0;

/// A fighter caught in an attack, with the knockback direction in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: PlayerId,
    pub angle: f32,
}

pub fn cooldown_elapsed(last_attack: Option<Instant>, now: Instant) -> bool {
    last_attack.is_none_or(|last| now.saturating_duration_since(last) >= ATTACK_COOLDOWN)
}

/// Every fighter other than the attacker strictly within `ATTACK_RADIUS`.
pub fn resolve_hits(
    attacker: PlayerId,
    origin: Vec2,
    fighters: impl IntoIterator<Item = (PlayerId, Vec2)>,
) -> SmallVec<[Hit; 8]> {
    fighters
        .into_iter()
        .filter(|&(id, pos)| id != attacker && origin.distance(pos) < ATTACK_RADIUS)
        .map(|(target, pos)| Hit {
            target,
            angle: origin.angle_to(pos),
        })
        .collect()
}

pub fn knockback(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()).scale(KNOCKBACK)
}

/// Random point near the field center, kept inside the arena walls.
pub fn respawn_point(rng: &mut impl Rng, field: &PlayField, margin: f32) -> Vec2 {
    let center = field.center();
    let p = Vec2::new(
        center.x + rng.random_range(-RESPAWN_SPREAD..=RESPAWN_SPREAD),
        center.y + rng.random_range(-RESPAWN_SPREAD..=RESPAWN_SPREAD),
    );
    field.clamp(p, margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn cooldown_boundaries() {
        let t0 = Instant::now();
        assert!(cooldown_elapsed(None, t0));
        assert!(!cooldown_elapsed(Some(t0), t0 + Duration::from_millis(200)));
        assert!(!cooldown_elapsed(Some(t0), t0 + Duration::from_millis(299)));
        assert!(cooldown_elapsed(Some(t0), t0 + Duration::from_millis(300)));
    }

    #[test]
    fn hits_exclude_attacker_and_far_fighters() {
        let origin = Vec2::new(100.0, 100.0);
        let hits = resolve_hits(
            1,
            origin,
            [
                (1, origin),
                (2, Vec2::new(100.0, 179.0)),
                (3, Vec2::new(100.0, 181.0)),
            ],
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, 2);
        assert!((hits[0].angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn respawn_stays_near_center() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = PlayField::new(1280.0, 720.0);
        for _ in 0..100 {
            let p = respawn_point(&mut rng, &field, 40.0);
            assert!((p.x - 640.0).abs() <= RESPAWN_SPREAD);
            assert!((p.y - 360.0).abs() <= RESPAWN_SPREAD);
        }
    }
}
