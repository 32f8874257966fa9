use bytes::Bytes;

use couchparty_core::net::messages::{
    ClientMessage, DEFAULT_VIBRATION_MS, JoinMsg, JoinRejectedMsg, RelayedActionMsg,
    RelayedInputMsg, RelayedTiltMsg, RosterMsg, RoundResultsMsg, RoundStartedMsg, ScoreMsg,
    ScoreUpdateMsg, ServerMessage, StartRoundMsg, VibrateMsg, VibrateRequestMsg,
};
use couchparty_core::session::{GamePhase, SessionSettings};

use crate::relay::{ConnectionId, ConnectionSender, Group, Relay, encode};
use crate::session::Session;

/// The session plus the relay that fans its events out.
///
/// Every handler runs to completion under the caller's write lock, so events
/// are applied strictly in arrival order.
pub struct Party {
    session: Session,
    relay: Relay,
    next_connection_id: ConnectionId,
}

impl Party {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            session: Session::new(settings),
            relay: Relay::new(),
            next_connection_id: 1,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn display_count(&self) -> usize {
        self.relay.count(Group::Displays)
    }

    /// Register a new WebSocket and allocate its id.
    pub fn connect(&mut self, sender: ConnectionSender) -> ConnectionId {
        let id = self.next_connection_id;
        self.next_connection_id += 1;
        self.relay.register(id, sender);
        id
    }

    pub fn disconnect(&mut self, id: ConnectionId) {
        match self.relay.unregister(id) {
            Some(Group::Players) => {
                if let Some(player) = self.session.remove(id) {
                    tracing::info!(player_id = id, name = %player.name, "Player left");
                }
                self.send_roster(Group::Displays);
                self.check_all_ready();
            },
            Some(Group::Displays) => {
                tracing::info!(connection_id = id, "Display left");
                if self.relay.count(Group::Displays) == 0 && self.session.abandon_round() {
                    tracing::warn!("Last display left mid-round, returning to lobby");
                    self.broadcast(Group::Players, &ServerMessage::ReturnedToLobby);
                    self.send_roster(Group::Players);
                }
            },
            Some(Group::Unassigned) | None => {},
        }
    }

    pub fn handle(&mut self, id: ConnectionId, msg: ClientMessage) {
        match msg {
            ClientMessage::Join(join) => self.on_join(id, join),
            ClientMessage::ReadyToggle => {
                if self.require(id, Group::Players, "ready-toggle")
                    && self.session.toggle_ready(id).is_some()
                {
                    self.send_roster(Group::Displays);
                    self.check_all_ready();
                }
            },
            ClientMessage::Input(input) => {
                if self.require(id, Group::Players, "input") {
                    self.broadcast(
                        Group::Displays,
                        &ServerMessage::PlayerInput(RelayedInputMsg {
                            player_id: id,
                            input,
                        }),
                    );
                }
            },
            ClientMessage::Tilt(tilt) => {
                if self.require(id, Group::Players, "tilt") {
                    self.broadcast(
                        Group::Displays,
                        &ServerMessage::PlayerTilt(RelayedTiltMsg { player_id: id, tilt }),
                    );
                }
            },
            ClientMessage::Action(action) => {
                if self.require(id, Group::Players, "action") {
                    self.broadcast(
                        Group::Displays,
                        &ServerMessage::PlayerAction(RelayedActionMsg {
                            player_id: id,
                            action,
                        }),
                    );
                }
            },
            ClientMessage::DisplayJoin => self.on_display_join(id),
            ClientMessage::StartRound(start) => {
                if self.require(id, Group::Displays, "start-round") {
                    self.on_start_round(start);
                }
            },
            ClientMessage::ScoreUpdate(update) => {
                if self.require(id, Group::Displays, "score-update") {
                    self.on_score_update(update);
                }
            },
            ClientMessage::Vibrate(request) => {
                if self.require(id, Group::Displays, "vibrate") {
                    self.on_vibrate(request);
                }
            },
            ClientMessage::EndRound(results) => {
                if self.require(id, Group::Displays, "end-round") {
                    self.on_end_round(results);
                }
            },
            ClientMessage::ReturnToLobby => {
                if self.require(id, Group::Displays, "return-to-lobby") {
                    self.on_return_to_lobby();
                }
            },
        }
    }

    fn on_join(&mut self, id: ConnectionId, join: JoinMsg) {
        if self.relay.group_of(id) == Some(Group::Displays) {
            tracing::warn!(connection_id = id, "Display sent join, ignoring");
            return;
        }
        match self.session.join(id, join.name.as_deref()) {
            Ok(player) => {
                tracing::info!(
                    player_id = id,
                    name = %player.name,
                    color = %player.color.to_hex(),
                    "Player joined"
                );
                self.relay.assign(id, Group::Players);
                self.send(id, &ServerMessage::Joined(player));
                self.send_roster(Group::Displays);
                self.check_all_ready();
            },
            Err(e) => {
                tracing::info!(connection_id = id, error = %e, "Join rejected");
                self.send(
                    id,
                    &ServerMessage::JoinRejected(JoinRejectedMsg {
                        reason: e.to_string(),
                    }),
                );
            },
        }
    }

    fn on_display_join(&mut self, id: ConnectionId) {
        if self.relay.group_of(id) == Some(Group::Players) {
            tracing::warn!(player_id = id, "Player sent display-join, ignoring");
            return;
        }
        self.relay.assign(id, Group::Displays);
        tracing::info!(connection_id = id, displays = self.display_count(), "Display joined");
        self.send(id, &ServerMessage::SessionState(self.session.snapshot()));
        self.send(id, &self.roster_message());
        if self.session.phase() == GamePhase::Lobby && self.session.is_all_ready() {
            self.send(id, &ServerMessage::AllReady);
        }
    }

    fn on_start_round(&mut self, start: StartRoundMsg) {
        match self.session.begin_round(start.game, &mut rand::rng()) {
            Ok(()) => {
                tracing::info!(game = %start.game, players = self.session.players().len(), "Round started");
                self.broadcast_all(&ServerMessage::RoundStarted(RoundStartedMsg {
                    game: start.game,
                    players: self.session.players().to_vec(),
                }));
                self.send_roster(Group::Displays);
            },
            Err(e) => tracing::warn!(game = %start.game, error = %e, "Cannot start round"),
        }
    }

    fn on_score_update(&mut self, update: ScoreUpdateMsg) {
        if self.session.record_score(update.player_id, update.score) {
            self.send(
                update.player_id,
                &ServerMessage::Score(ScoreMsg {
                    score: update.score,
                }),
            );
        } else {
            tracing::debug!(player_id = update.player_id, "Dropping score for absent player");
        }
    }

    fn on_vibrate(&mut self, request: VibrateRequestMsg) {
        if self.session.player(request.player_id).is_none() {
            tracing::debug!(player_id = request.player_id, "Dropping vibrate for absent player");
            return;
        }
        let pattern = if request.pattern.is_empty() {
            vec![DEFAULT_VIBRATION_MS]
        } else {
            request.pattern
        };
        self.send(request.player_id, &ServerMessage::Vibrate(VibrateMsg { pattern }));
    }

    fn on_end_round(&mut self, results: RoundResultsMsg) {
        match self.session.finish_round(results) {
            Ok(results) => {
                tracing::info!(
                    game = ?results.game,
                    entries = results.results.len(),
                    "Round ended"
                );
                self.broadcast_all(&ServerMessage::RoundEnded(results));
            },
            Err(e) => tracing::warn!(error = %e, "Cannot end round"),
        }
    }

    fn on_return_to_lobby(&mut self) {
        match self.session.return_to_lobby() {
            Ok(()) => {
                tracing::info!("Returned to lobby");
                self.broadcast_all(&ServerMessage::ReturnedToLobby);
                self.send_roster(Group::Displays);
                self.send_roster(Group::Players);
            },
            Err(e) => tracing::warn!(error = %e, "Cannot return to lobby"),
        }
    }

    fn require(&self, id: ConnectionId, group: Group, event: &'static str) -> bool {
        let actual = self.relay.group_of(id);
        if actual == Some(group) {
            return true;
        }
        tracing::warn!(connection_id = id, ?actual, event, "Dropping event from wrong role");
        false
    }

    fn check_all_ready(&mut self) {
        if self.session.refresh_all_ready() {
            tracing::info!(players = self.session.players().len(), "All players ready");
            self.broadcast(Group::Displays, &ServerMessage::AllReady);
        }
    }

    fn roster_message(&self) -> ServerMessage {
        ServerMessage::Roster(RosterMsg {
            players: self.session.players().to_vec(),
        })
    }

    fn send_roster(&self, group: Group) {
        self.broadcast(group, &self.roster_message());
    }

    fn send(&self, id: ConnectionId, msg: &ServerMessage) {
        if let Some(data) = encode(msg) {
            self.relay.send_to(id, data);
        }
    }

    fn broadcast(&self, group: Group, msg: &ServerMessage) {
        if let Some(data) = encode(msg) {
            self.relay.broadcast_group(group, &data);
        }
    }

    fn broadcast_all(&self, msg: &ServerMessage) {
        if let Some(data) = encode(msg) {
            self.relay.broadcast_all(&data);
        }
    }
}

/// Drain every frame queued for a connection, decoded. Test support.
#[cfg(test)]
pub(crate) fn drain(rx: &mut tokio::sync::mpsc::Receiver<Bytes>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(data) = rx.try_recv() {
        out.push(couchparty_core::net::protocol::decode_server_message(&data).unwrap());
    }
    out
}
