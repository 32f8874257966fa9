use std::time::{Duration, Instant};

use couchparty_core::game_trait::{GameEvent, Motion};
use couchparty_core::net::messages::{
    ClientMessage, ScoreUpdateMsg, ServerMessage, StartRoundMsg, VibrateRequestMsg,
};
use couchparty_core::render::Frame;
use couchparty_core::session::{GameKind, GamePhase, SessionSettings};

use crate::config::{DisplayConfig, DisplayRole};
use crate::error::RoundError;
use crate::registry::GameRegistry;
use crate::round::{RoundController, RoundId};

/// One shared screen: reacts to server events and decides what to send back.
///
/// Everything here is synchronous. The runtime feeds it server messages,
/// simulation ticks and countdown ticks, and forwards whatever
/// `ClientMessage`s come back.
pub struct Display {
    role: DisplayRole,
    auto_start: Option<GameKind>,
    results_hold: Option<Duration>,
    controller: RoundController,
    results_since: Option<Instant>,
    return_sent: bool,
    start_requested: bool,
    /// Phase as last announced by the server.
    session_phase: GamePhase,
}

impl Display {
    pub fn new(config: &DisplayConfig, registry: GameRegistry) -> Self {
        Self {
            role: config.role,
            auto_start: config.auto_start,
            results_hold: config.results_hold_secs.map(Duration::from_secs),
            controller: RoundController::new(
                registry,
                config.field.play_field(),
                SessionSettings::default().round_duration_secs,
            ),
            results_since: None,
            return_sent: false,
            start_requested: false,
            session_phase: GamePhase::Lobby,
        }
    }

    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    pub fn is_playing(&self) -> bool {
        self.controller.phase() == GamePhase::Playing
    }

    pub fn round_id(&self) -> Option<RoundId> {
        self.controller.active().map(|a| a.id)
    }

    pub fn handle(&mut self, msg: ServerMessage, now: Instant) -> Vec<ClientMessage> {
        match msg {
            ServerMessage::SessionState(snapshot) => {
                self.controller
                    .set_round_duration(snapshot.round_duration_secs);
                self.session_phase = snapshot.phase;
                if snapshot.phase == GamePhase::Lobby && self.controller.phase() != GamePhase::Lobby
                {
                    self.enter_lobby();
                }
                self.controller.roster_changed(&snapshot.players);
                tracing::info!(
                    players = snapshot.players.len(),
                    phase = ?snapshot.phase,
                    round_secs = snapshot.round_duration_secs,
                    "Session state received"
                );
                self.auto_start_if_ready()
            },
            ServerMessage::Roster(roster) => {
                self.controller.roster_changed(&roster.players);
                self.auto_start_if_ready()
            },
            ServerMessage::AllReady => {
                tracing::info!(players = self.controller.roster().len(), "All players ready");
                self.auto_start()
            },
            ServerMessage::PlayerInput(m) => {
                self.controller
                    .apply_motion(m.player_id, Motion::Stick(m.input.vector()));
                Vec::new()
            },
            ServerMessage::PlayerTilt(m) => {
                self.controller
                    .apply_motion(m.player_id, Motion::Tilt(m.tilt.vector()));
                Vec::new()
            },
            ServerMessage::PlayerAction(m) => {
                let events = self.controller.apply_action(m.player_id, &m.action, now);
                self.outbound(events)
            },
            ServerMessage::RoundStarted(started) => {
                self.start_requested = false;
                self.session_phase = GamePhase::Playing;
                if let Err(e) = self.controller.begin(started.game, &started.players) {
                    tracing::warn!(game = %started.game, error = %e, "Cannot begin round");
                }
                Vec::new()
            },
            ServerMessage::RoundEnded(results) => {
                self.session_phase = GamePhase::Results;
                self.controller.show_results(results);
                self.results_since.get_or_insert(now);
                Vec::new()
            },
            ServerMessage::ReturnedToLobby => {
                self.session_phase = GamePhase::Lobby;
                self.enter_lobby();
                Vec::new()
            },
            ServerMessage::Joined(_)
            | ServerMessage::JoinRejected(_)
            | ServerMessage::Score(_)
            | ServerMessage::Vibrate(_) => {
                tracing::debug!("Ignoring controller-only message");
                Vec::new()
            },
        }
    }

    /// Ask the server to start a `game` round with the current lobby.
    pub fn start_round(&mut self, game: GameKind) -> Result<ClientMessage, RoundError> {
        self.controller.can_start(game)?;
        self.start_requested = true;
        tracing::info!(game = %game, players = self.controller.roster().len(), "Requesting round");
        Ok(ClientMessage::StartRound(StartRoundMsg { game }))
    }

    /// Advance the simulation one step.
    pub fn tick(&mut self, now: Instant) -> Vec<ClientMessage> {
        let events = self.controller.tick(now);
        self.outbound(events)
    }

    /// One second of round time; finishes the round when it runs out.
    pub fn countdown_tick(&mut self, now: Instant) -> Vec<ClientMessage> {
        if !self.controller.countdown_tick() {
            return Vec::new();
        }
        match self.controller.finish() {
            Ok(results) => {
                self.results_since = Some(now);
                if self.role == DisplayRole::Primary {
                    vec![ClientMessage::EndRound(results)]
                } else {
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Countdown expired without a round");
                Vec::new()
            },
        }
    }

    /// When the results screen should give way to the lobby, if automated.
    pub fn results_deadline(&self) -> Option<Instant> {
        if self.role != DisplayRole::Primary || self.return_sent {
            return None;
        }
        Some(self.results_since? + self.results_hold?)
    }

    pub fn results_hold_elapsed(&mut self) -> Vec<ClientMessage> {
        if self.results_deadline().is_none() {
            return Vec::new();
        }
        self.return_sent = true;
        if self.controller.phase() != GamePhase::Results {
            return Vec::new();
        }
        tracing::info!("Results shown, returning to lobby");
        vec![ClientMessage::ReturnToLobby]
    }

    pub fn render(&self, frame: &mut Frame) {
        self.controller.render(frame);
    }

    fn enter_lobby(&mut self) {
        self.controller.return_to_lobby();
        self.results_since = None;
        self.return_sent = false;
        self.start_requested = false;
    }

    /// Auto-start from a roster that is already complete, covering a display
    /// that joined after the all-ready signal went out.
    fn auto_start_if_ready(&mut self) -> Vec<ClientMessage> {
        let roster = self.controller.roster();
        if roster.is_empty() || !roster.iter().all(|p| p.is_ready) {
            self.start_requested = false;
            return Vec::new();
        }
        self.auto_start()
    }

    fn auto_start(&mut self) -> Vec<ClientMessage> {
        let Some(game) = self.auto_start else {
            return Vec::new();
        };
        if self.role != DisplayRole::Primary
            || self.start_requested
            || self.session_phase != GamePhase::Lobby
        {
            return Vec::new();
        }
        match self.start_round(game) {
            Ok(msg) => vec![msg],
            Err(e) => {
                tracing::debug!(game = %game, error = %e, "Not auto-starting");
                Vec::new()
            },
        }
    }

    fn outbound(&self, events: Vec<GameEvent>) -> Vec<ClientMessage> {
        if self.role != DisplayRole::Primary {
            return Vec::new();
        }
        events
            .into_iter()
            .map(|event| match event {
                GameEvent::ScoreChanged { player_id, score } => {
                    ClientMessage::ScoreUpdate(ScoreUpdateMsg { player_id, score })
                },
                GameEvent::Vibrate { player_id, pattern } => {
                    ClientMessage::Vibrate(VibrateRequestMsg { player_id, pattern })
                },
            })
            .collect()
    }
}
