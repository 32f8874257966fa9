use serde::{Deserialize, Serialize};

use couchparty_core::physics::{PlayField, Vec2};

pub const CHECKPOINT_COUNT: usize = 8;
pub const CHECKPOINT_RADIUS: f32 = 30.0;
/// Upper bound on the track radius in pixels.
pub const MAX_TRACK_RADIUS: f32 = 250.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub index: usize,
    pub pos: Vec2,
    pub radius: f32,
}

/// Circular track with checkpoints that must be taken in index order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub center: Vec2,
    pub radius: f32,
    pub checkpoints: Vec<Checkpoint>,
}

/// What a racer achieved on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Checkpoint,
    /// Took the last checkpoint and wrapped back to the first.
    Lap,
}

impl Track {
    pub fn for_field(field: &PlayField) -> Self {
        let center = field.center();
        let radius = MAX_TRACK_RADIUS.min(field.width / 3.0);
        let checkpoints = (0..CHECKPOINT_COUNT)
            .map(|index| {
                let angle = (index as f32 / CHECKPOINT_COUNT as f32) * std::f32::consts::TAU
                    - std::f32::consts::FRAC_PI_2;
                Checkpoint {
                    index,
                    pos: Vec2::new(
                        center.x + angle.cos() * radius,
                        center.y + angle.sin() * radius,
                    ),
                    radius: CHECKPOINT_RADIUS,
                }
            })
            .collect();
        Self {
            center,
            radius,
            checkpoints,
        }
    }

    /// Test the racer at `pos` against its current target. On capture the
    /// target advances (wrapping) and `laps` is bumped on wrap.
    pub fn try_capture(
        &self,
        current: &mut usize,
        laps: &mut u32,
        pos: Vec2,
        racer_radius: f32,
    ) -> Option<Capture> {
        let target = self.checkpoints.get(*current)?;
        if pos.distance(target.pos) >= target.radius + racer_radius {
            return None;
        }
        *current += 1;
        if *current >= self.checkpoints.len() {
            *current = 0;
            *laps += 1;
            Some(Capture::Lap)
        } else {
            Some(Capture::Checkpoint)
        }
    }
}
