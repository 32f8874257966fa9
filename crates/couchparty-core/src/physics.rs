//! Shared 2D kinematics for the display-side simulations.

use serde::{Deserialize, Serialize};

/// Default diameter of a player object in pixels.
pub const OBJECT_SIZE: f32 = 50.0;

/// Base speed multiplier applied to controller vectors.
pub const BASE_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle in radians of the vector pointing from `self` to `other`.
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn scale(self, k: f32) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Dimensions of the display canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a point into the field shrunk by `margin` on every side.
    pub fn clamp(&self, p: Vec2, margin: f32) -> Vec2 {
        // A field narrower than twice the margin collapses onto its center line.
        let clamp_axis = |v: f32, extent: f32| {
            if extent <= margin * 2.0 {
                extent / 2.0
            } else {
                v.clamp(margin, extent - margin)
            }
        };
        Vec2::new(clamp_axis(p.x, self.width), clamp_axis(p.y, self.height))
    }
}

/// Kinematic state shared by every game object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub speed: f32,
}

impl Body {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: OBJECT_SIZE,
            speed: BASE_SPEED,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Replace velocity from a controller vector in [-1, 1].
    pub fn steer(&mut self, dir: Vec2, multiplier: f32) {
        let k = self.speed * multiplier;
        self.vel = Vec2::new(sanitize_axis(dir.x) * k, sanitize_axis(dir.y) * k);
    }

    /// Integrate, decay velocity exponentially, and clamp into bounds.
    pub fn advance(&mut self, friction: f32, field: &PlayField, margin: f32) {
        self.pos += self.vel;
        self.vel = self.vel.scale(friction);
        self.pos = field.clamp(self.pos, margin);
    }
}

/// Coerce a controller axis into [-1, 1], mapping non-finite values to 0.
pub fn sanitize_axis(v: f32) -> f32 {
    if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Evenly spaced start positions on a circle, first player at the top.
pub fn start_positions(count: usize, field: &PlayField) -> Vec<Vec2> {
    let center = field.center();
    let radius = 200.0_f32.min(field.width / 4.0);
    (0..count)
        .map(|i| {
            let angle =
                (i as f32 / count as f32) * std::f32::consts::TAU - std::f32::consts::FRAC_PI_2;
            Vec2::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            )
        })
        .collect()
}
