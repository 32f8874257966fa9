use std::time::Instant;

use uuid::Uuid;

use couchparty_core::game_trait::{GameEvent, MiniGame, Motion};
use couchparty_core::net::messages::{ActionMsg, RoundResultsMsg};
use couchparty_core::physics::PlayField;
use couchparty_core::player::{Player, PlayerId};
use couchparty_core::ranking::rank_results;
use couchparty_core::render::Frame;
use couchparty_core::session::{GameKind, GamePhase};

use crate::error::RoundError;
use crate::registry::GameRegistry;
use crate::render::{draw_countdown, draw_lobby, draw_results};

pub type RoundId = Uuid;

/// Everything that exists only for the duration of one round. Dropped as a
/// unit when the round finishes.
pub struct ActiveRound {
    pub id: RoundId,
    pub kind: GameKind,
    game: Box<dyn MiniGame>,
    /// Players still in the round, in roster order.
    players: Vec<Player>,
    remaining_secs: u32,
    ticks: u64,
}

impl ActiveRound {
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn game(&self) -> &dyn MiniGame {
        self.game.as_ref()
    }
}

/// Local `lobby -> playing -> results -> lobby` state machine of a display.
pub struct RoundController {
    registry: GameRegistry,
    field: PlayField,
    round_duration_secs: u32,
    roster: Vec<Player>,
    phase: GamePhase,
    active: Option<ActiveRound>,
    results: Option<RoundResultsMsg>,
}

impl RoundController {
    pub fn new(registry: GameRegistry, field: PlayField, round_duration_secs: u32) -> Self {
        Self {
            registry,
            field,
            round_duration_secs,
            roster: Vec::new(),
            phase: GamePhase::Lobby,
            active: None,
            results: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn active(&self) -> Option<&ActiveRound> {
        self.active.as_ref()
    }

    pub fn results(&self) -> Option<&RoundResultsMsg> {
        self.results.as_ref()
    }

    pub fn round_duration_secs(&self) -> u32 {
        self.round_duration_secs
    }

    pub fn set_round_duration(&mut self, secs: u32) {
        self.round_duration_secs = secs;
    }

    /// Check that a `kind` round could be requested from the server now.
    pub fn can_start(&self, kind: GameKind) -> Result<(), RoundError> {
        if self.phase != GamePhase::Lobby {
            return Err(RoundError::InvalidPhase {
                phase: self.phase,
                action: "start a round",
            });
        }
        if self.roster.is_empty() {
            return Err(RoundError::NoPlayers);
        }
        if !self.registry.contains(kind) {
            return Err(RoundError::UnknownGame(kind));
        }
        Ok(())
    }

    /// Start a round with the roster snapshot the server broadcast.
    pub fn begin(&mut self, kind: GameKind, players: &[Player]) -> Result<RoundId, RoundError> {
        if let Some(active) = &self.active {
            return Err(RoundError::RoundInProgress(active.id));
        }
        if self.phase != GamePhase::Lobby {
            return Err(RoundError::InvalidPhase {
                phase: self.phase,
                action: "start a round",
            });
        }
        let mut game = self
            .registry
            .create(kind)
            .ok_or(RoundError::UnknownGame(kind))?;
        game.init(players, &self.field);

        let id = Uuid::new_v4();
        tracing::info!(round_id = %id, game = %kind, players = players.len(), "Round begins");
        self.roster = players.to_vec();
        self.active = Some(ActiveRound {
            id,
            kind,
            game,
            players: players.to_vec(),
            remaining_secs: self.round_duration_secs,
            ticks: 0,
        });
        self.results = None;
        self.phase = GamePhase::Playing;
        Ok(id)
    }

    pub fn apply_motion(&mut self, player_id: PlayerId, motion: Motion) {
        if let Some(active) = &mut self.active {
            active.game.apply_motion(player_id, motion);
        }
    }

    pub fn apply_action(
        &mut self,
        player_id: PlayerId,
        action: &ActionMsg,
        now: Instant,
    ) -> Vec<GameEvent> {
        match &mut self.active {
            Some(active) => active.game.apply_action(player_id, action, now),
            None => Vec::new(),
        }
    }

    /// One simulation step. A no-op outside `Playing`.
    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        match &mut self.active {
            Some(active) if self.phase == GamePhase::Playing => {
                active.ticks += 1;
                active.game.update(now)
            },
            _ => Vec::new(),
        }
    }

    /// One second of round time. Returns true when the countdown hits zero.
    pub fn countdown_tick(&mut self) -> bool {
        match &mut self.active {
            Some(active) if self.phase == GamePhase::Playing => {
                active.remaining_secs = active.remaining_secs.saturating_sub(1);
                active.remaining_secs == 0
            },
            _ => false,
        }
    }

    /// Freeze the round and rank its final scores.
    pub fn finish(&mut self) -> Result<RoundResultsMsg, RoundError> {
        let active = self.active.take().ok_or(RoundError::NoActiveRound)?;
        let results = RoundResultsMsg {
            game: Some(active.kind),
            results: rank_results(&active.players, &active.game.scores()),
        };
        tracing::info!(
            round_id = %active.id,
            game = %active.kind,
            ticks = active.ticks,
            "Round finished"
        );
        self.phase = GamePhase::Results;
        self.results = Some(results.clone());
        Ok(results)
    }

    /// Show results decided elsewhere, abandoning any local round.
    pub fn show_results(&mut self, results: RoundResultsMsg) {
        if let Some(active) = self.active.take() {
            tracing::debug!(round_id = %active.id, "Dropping local round for announced results");
        }
        self.phase = GamePhase::Results;
        self.results = Some(results);
    }

    pub fn return_to_lobby(&mut self) {
        self.active = None;
        self.results = None;
        self.phase = GamePhase::Lobby;
        for player in &mut self.roster {
            player.score = 0;
            player.is_ready = false;
        }
    }

    /// Adopt a new roster. Players missing from it leave the running round.
    pub fn roster_changed(&mut self, players: &[Player]) {
        if let Some(active) = &mut self.active {
            let round_id = active.id;
            let game = &mut active.game;
            active.players.retain(|p| {
                let present = players.iter().any(|q| q.id == p.id);
                if !present {
                    tracing::debug!(%round_id, player_id = p.id, "Player left round");
                    game.player_left(p.id);
                }
                present
            });
        }
        self.roster = players.to_vec();
    }

    pub fn render(&self, frame: &mut Frame) {
        frame.clear();
        match (&self.active, self.phase) {
            (Some(active), GamePhase::Playing) => {
                active.game.render(frame);
                draw_countdown(frame, active.remaining_secs, &self.field);
            },
            (_, GamePhase::Results) => {
                let results = self.results.as_ref().map(|r| r.results.as_slice());
                draw_results(frame, results.unwrap_or_default(), &self.field);
            },
            _ => draw_lobby(frame, &self.roster, &self.field),
        }
    }
}
