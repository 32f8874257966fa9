use serde::{Deserialize, Serialize};

use crate::physics::Vec2;
use crate::player::PlayerColor;

/// A drawable primitive in canvas pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Disc {
        center: Vec2,
        radius: f32,
        color: PlayerColor,
        alpha: f32,
    },
    Ring {
        center: Vec2,
        radius: f32,
        color: PlayerColor,
        alpha: f32,
    },
    Label {
        at: Vec2,
        text: String,
        color: PlayerColor,
    },
    /// Horizontal gauge, `fill` in [0, 1].
    Gauge {
        at: Vec2,
        width: f32,
        fill: f32,
        color: PlayerColor,
    },
}

/// One rendered tick: world shapes plus text overlay lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub title: String,
    pub shapes: Vec<Shape>,
    pub hud: Vec<String>,
}

impl Frame {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn hud_line(&mut self, line: impl Into<String>) {
        self.hud.push(line.into());
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.shapes.clear();
        self.hud.clear();
    }
}

/// Draw a player token: colored disc, initial, and name underneath.
pub fn draw_player(frame: &mut Frame, center: Vec2, radius: f32, color: PlayerColor, name: &str) {
    frame.push(Shape::Disc {
        center,
        radius,
        color,
        alpha: 1.0,
    });
    let initial: String = name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    frame.push(Shape::Label {
        at: center,
        text: initial,
        color: WHITE,
    });
    frame.push(Shape::Label {
        at: Vec2::new(center.x, center.y + radius + 20.0),
        text: name.to_string(),
        color: WHITE,
    });
}

pub const WHITE: PlayerColor = PlayerColor::rgb(0xFF, 0xFF, 0xFF);
pub const HIGHLIGHT: PlayerColor = PlayerColor::rgb(0x2E, 0xD5, 0x73);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_token_uses_uppercase_initial() {
        let mut frame = Frame::new("t");
        draw_player(&mut frame, Vec2::new(10.0, 10.0), 25.0, WHITE, "zoe");
        assert_eq!(frame.shapes.len(), 3);
        assert!(matches!(&frame.shapes[1], Shape::Label { text, .. } if text == "Z"));
    }
}
