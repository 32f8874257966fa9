pub mod questions;
pub mod scoring;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use couchparty_core::game_trait::{GameEvent, GameMetadata, MiniGame, Motion};
use couchparty_core::mini_game_boilerplate;
use couchparty_core::net::messages::{ActionKind, ActionMsg};
use couchparty_core::physics::{PlayField, Vec2, start_positions};
use couchparty_core::player::{Player, PlayerColor, PlayerId};
use couchparty_core::render::{Frame, HIGHLIGHT, Shape, WHITE, draw_player};
use couchparty_core::session::GameKind;

use questions::{OPTION_LETTERS, QUESTIONS, Question, option_index};
use scoring::answer_points;

/// Ticks a question stays open.
pub const QUESTION_TICKS: u32 = 100;
/// Wall-clock pause between a question closing and the next one opening.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(2000);

const BOX_MAX_WIDTH: f32 = 800.0;
const BOX_TOP: f32 = 150.0;
const TIMER_COLOR: PlayerColor = PlayerColor::rgb(0x00, 0xFF, 0xFF);
const OPTION_COLORS: [PlayerColor; 4] = [
    PlayerColor::rgb(0xFF, 0x6B, 0x6B),
    PlayerColor::rgb(0x4E, 0xCD, 0xC4),
    PlayerColor::rgb(0x45, 0xB7, 0xD1),
    PlayerColor::rgb(0x96, 0xCE, 0xB4),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizState {
    pub question_index: usize,
    pub showing_question: bool,
    pub timer_ticks: u32,
    /// Players who answered the open question, in answer order.
    pub answered: Vec<PlayerId>,
    pub contestants: HashMap<PlayerId, Contestant>,
    pub scores: HashMap<PlayerId, i32>,
    pub field: PlayField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub name: String,
    pub color: PlayerColor,
    pub pos: Vec2,
}

/// Buzz-in trivia over a fixed question bank.
pub struct QuickQuiz {
    state: QuizState,
    player_ids: Vec<PlayerId>,
    closed_at: Option<Instant>,
}

impl QuickQuiz {
    pub fn new() -> Self {
        Self {
            state: QuizState {
                question_index: 0,
                showing_question: false,
                timer_ticks: 0,
                answered: Vec::new(),
                contestants: HashMap::new(),
                scores: HashMap::new(),
                field: PlayField::default(),
            },
            player_ids: Vec::new(),
            closed_at: None,
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn current_question(&self) -> &'static Question {
        &QUESTIONS[self.state.question_index % QUESTIONS.len()]
    }

    fn open_question(&mut self, index: usize) {
        self.state.question_index = index % QUESTIONS.len();
        self.state.answered.clear();
        self.state.showing_question = true;
        self.state.timer_ticks = QUESTION_TICKS;
        self.closed_at = None;
    }

    fn close_question(&mut self, now: Instant) {
        self.state.showing_question = false;
        self.closed_at = Some(now);
        tracing::debug!(
            question = self.state.question_index,
            answers = self.state.answered.len(),
            "Question closed"
        );
    }

    fn everyone_answered(&self) -> bool {
        !self.player_ids.is_empty()
            && self
                .player_ids
                .iter()
                .all(|id| self.state.answered.contains(id))
    }

    fn answer(&mut self, player_id: PlayerId, answer: &str, now: Instant) -> Vec<GameEvent> {
        if !self.state.showing_question
            || !self.state.contestants.contains_key(&player_id)
            || self.state.answered.contains(&player_id)
        {
            return Vec::new();
        }
        let Some(choice) = option_index(answer) else {
            return Vec::new();
        };

        let prior = self.state.answered.len();
        self.state.answered.push(player_id);

        let mut events = Vec::new();
        if choice == self.current_question().correct {
            let score = self.state.scores.entry(player_id).or_insert(0);
            *score += answer_points(prior);
            events.push(GameEvent::ScoreChanged {
                player_id,
                score: *score,
            });
        }
        if self.everyone_answered() {
            self.close_question(now);
        }
        events
    }
}

impl Default for QuickQuiz {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniGame for QuickQuiz {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            kind: GameKind::Quiz,
            title: "Quick Quiz".to_string(),
            description: "Answer with A to D. Faster correct answers score more.".to_string(),
        }
    }

    fn init(&mut self, players: &[Player], field: &PlayField) {
        self.state.contestants.clear();
        self.state.scores.clear();
        self.state.field = *field;
        self.player_ids.clear();

        let starts = start_positions(players.len(), field);
        for (player, pos) in players.iter().zip(starts) {
            self.player_ids.push(player.id);
            self.state.contestants.insert(
                player.id,
                Contestant {
                    name: player.name.clone(),
                    color: player.color,
                    pos,
                },
            );
            self.state.scores.insert(player.id, 0);
        }
        self.open_question(0);
    }

    // Contestants stay put; the controller only answers.
    fn apply_motion(&mut self, _player_id: PlayerId, _motion: Motion) {}

    fn apply_action(
        &mut self,
        player_id: PlayerId,
        action: &ActionMsg,
        now: Instant,
    ) -> Vec<GameEvent> {
        match (action.kind, action.answer.as_deref()) {
            (ActionKind::Answer, Some(answer)) => self.answer(player_id, answer, now),
            _ => Vec::new(),
        }
    }

    fn update(&mut self, now: Instant) -> Vec<GameEvent> {
        if self.state.showing_question {
            self.state.timer_ticks = self.state.timer_ticks.saturating_sub(1);
            if self.state.timer_ticks == 0 || self.everyone_answered() {
                self.close_question(now);
            }
        } else if let Some(closed_at) = self.closed_at
            && now.saturating_duration_since(closed_at) >= ADVANCE_DELAY
        {
            self.open_question(self.state.question_index + 1);
        }
        Vec::new()
    }

    fn player_left(&mut self, player_id: PlayerId) {
        self.player_ids.retain(|&id| id != player_id);
        self.state.contestants.remove(&player_id);
        self.state.scores.remove(&player_id);
    }

    fn render(&self, frame: &mut Frame) {
        frame.title = self.metadata().title;
        let question = self.current_question();
        let field = &self.state.field;
        let box_width = BOX_MAX_WIDTH.min(field.width - 100.0).max(0.0);
        let box_left = (field.width - box_width) / 2.0;

        frame.push(Shape::Label {
            at: Vec2::new(field.width / 2.0, BOX_TOP + 60.0),
            text: question.text.to_string(),
            color: WHITE,
        });
        for (i, option) in question.options.iter().enumerate() {
            let col = (i % 2) as f32;
            let row = (i / 2) as f32;
            let reveal = !self.state.showing_question && i == question.correct;
            frame.push(Shape::Label {
                at: Vec2::new(
                    box_left + 50.0 + col * (box_width / 2.0 - 30.0),
                    BOX_TOP + 100.0 + row * 45.0,
                ),
                text: format!("{}: {option}", OPTION_LETTERS[i]),
                color: if reveal { HIGHLIGHT } else { OPTION_COLORS[i] },
            });
        }
        frame.push(Shape::Gauge {
            at: Vec2::new(box_left, BOX_TOP + 190.0),
            width: box_width,
            fill: self.state.timer_ticks as f32 / QUESTION_TICKS as f32,
            color: TIMER_COLOR,
        });

        frame.hud_line(format!(
            "Question {}/{}",
            self.state.question_index + 1,
            QUESTIONS.len()
        ));
        for pid in &self.player_ids {
            let Some(c) = self.state.contestants.get(pid) else {
                continue;
            };
            draw_player(frame, c.pos, 25.0, c.color, &c.name);
            if self.state.answered.contains(pid) {
                frame.push(Shape::Ring {
                    center: c.pos,
                    radius: 31.0,
                    color: WHITE,
                    alpha: 1.0,
                });
            }
            frame.hud_line(format!(
                "{}: {} pts",
                c.name,
                self.state.scores.get(pid).copied().unwrap_or(0)
            ));
        }
    }

    mini_game_boilerplate!();
}
