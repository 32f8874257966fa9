use couchparty_core::physics::{OBJECT_SIZE, PlayField, Vec2, start_positions};
use couchparty_core::player::{Player, PlayerColor};
use couchparty_core::ranking::RankedEntry;
use couchparty_core::render::{Frame, HIGHLIGHT, Shape, WHITE, draw_player};

/// Seconds left at which the countdown turns red.
pub const LOW_TIME_SECS: u32 = 10;

const TIMER_COLOR: PlayerColor = PlayerColor::rgb(0x00, 0xFF, 0xFF);
const TIMER_LOW_COLOR: PlayerColor = PlayerColor::rgb(0xFF, 0x44, 0x44);
const RESULT_ROW_HEIGHT: f32 = 60.0;

/// Where finished frames go. Canvas drawing lives behind this seam.
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame);
}

/// Logs a one-line summary of every frame at trace level.
#[derive(Debug, Default)]
pub struct LogSink;

impl FrameSink for LogSink {
    fn present(&mut self, frame: &Frame) {
        tracing::trace!(
            title = %frame.title,
            shapes = frame.shapes.len(),
            hud = %frame.hud.join(" | "),
            "frame"
        );
    }
}

/// Discards frames.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &Frame) {}
}

pub fn draw_lobby(frame: &mut Frame, roster: &[Player], field: &PlayField) {
    frame.title = "Lobby".to_string();
    let ready = roster.iter().filter(|p| p.is_ready).count();
    for (player, pos) in roster.iter().zip(start_positions(roster.len(), field)) {
        if player.is_ready {
            frame.push(Shape::Ring {
                center: pos,
                radius: OBJECT_SIZE / 2.0 + 6.0,
                color: HIGHLIGHT,
                alpha: 1.0,
            });
        }
        draw_player(frame, pos, OBJECT_SIZE / 2.0, player.color, &player.name);
    }
    if roster.is_empty() {
        frame.push(Shape::Label {
            at: field.center(),
            text: "Waiting for players...".to_string(),
            color: WHITE,
        });
    }
    frame.hud_line(format!("Players: {}", roster.len()));
    frame.hud_line(format!("Ready: {ready}/{}", roster.len()));
}

/// Countdown label drawn over the playing field.
pub fn draw_countdown(frame: &mut Frame, remaining_secs: u32, field: &PlayField) {
    let color = if remaining_secs <= LOW_TIME_SECS {
        TIMER_LOW_COLOR
    } else {
        TIMER_COLOR
    };
    frame.push(Shape::Label {
        at: Vec2::new(field.width / 2.0, 30.0),
        text: remaining_secs.to_string(),
        color,
    });
    frame.hud_line(format!("Time: {remaining_secs}s"));
}

pub fn draw_results(frame: &mut Frame, results: &[RankedEntry], field: &PlayField) {
    frame.title = "Results".to_string();
    let top = field.height / 2.0 - results.len() as f32 * RESULT_ROW_HEIGHT / 2.0;
    for (i, entry) in results.iter().enumerate() {
        let at = Vec2::new(field.width / 2.0, top + i as f32 * RESULT_ROW_HEIGHT);
        frame.push(Shape::Label {
            at,
            text: format!("{}. {}  {}", entry.rank, entry.name, entry.score),
            color: entry.color,
        });
        frame.hud_line(format!("#{} {} ({})", entry.rank, entry.name, entry.score));
    }
}
