use rand::Rng;

use couchparty_core::net::messages::RoundResultsMsg;
use couchparty_core::physics::Vec2;
use couchparty_core::player::{Player, PlayerColor, PlayerId};
use couchparty_core::session::{GameKind, GamePhase, SessionSettings, SessionSnapshot};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 32;
/// Area the fresh round-start positions are drawn from.
pub const SPAWN_WIDTH: f32 = 800.0;
pub const SPAWN_HEIGHT: f32 = 600.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    CapacityExceeded { max_players: usize },
    NoPlayers,
    InvalidTransition {
        phase: GamePhase,
        action: &'static str,
    },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { .. } => write!(f, "Game is full!"),
            Self::NoPlayers => write!(f, "at least one player must join before a round starts"),
            Self::InvalidTransition { phase, action } => {
                write!(f, "cannot {action} while the session is in {phase:?}")
            },
        }
    }
}

impl std::error::Error for SessionError {}

/// Server-wide roster and round phase.
///
/// Players are kept in join order. `current_game` is `Some` exactly when the
/// phase is `Playing` or `Results`.
#[derive(Debug, Default)]
pub struct Session {
    players: Vec<Player>,
    current_game: Option<GameKind>,
    phase: GamePhase,
    settings: SessionSettings,
    all_ready: bool,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_game(&self) -> Option<GameKind> {
        self.current_game
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Register a player for `id`. Color and default name come from the
    /// roster size at join time. Joining again returns the existing record.
    pub fn join(&mut self, id: PlayerId, requested_name: Option<&str>) -> Result<Player, SessionError> {
        if let Some(existing) = self.player(id) {
            return Ok(existing.clone());
        }
        if self.players.len() >= self.settings.max_players {
            return Err(SessionError::CapacityExceeded {
                max_players: self.settings.max_players,
            });
        }

        let join_index = self.players.len();
        let name = clean_name(requested_name.unwrap_or_default())
            .unwrap_or_else(|| format!("Player {}", join_index + 1));
        let player = Player::new(id, name, PlayerColor::for_join_index(join_index));
        self.players.push(player.clone());
        Ok(player)
    }

    /// Remove a player. No-op for ids that never joined.
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(idx))
    }

    /// Flip the ready flag and return its new value.
    pub fn toggle_ready(&mut self, id: PlayerId) -> Option<bool> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        player.is_ready = !player.is_ready;
        Some(player.is_ready)
    }

    pub fn is_all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.is_ready)
    }

    /// Recompute the all-ready latch. Returns true only on the transition
    /// into the all-ready state.
    pub fn refresh_all_ready(&mut self) -> bool {
        let now_ready = self.is_all_ready();
        let fired = now_ready && !self.all_ready;
        self.all_ready = now_ready;
        fired
    }

    pub fn begin_round(&mut self, game: GameKind, rng: &mut impl Rng) -> Result<(), SessionError> {
        if self.phase != GamePhase::Lobby {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "start a round",
            });
        }
        if self.players.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        for player in &mut self.players {
            player.score = 0;
            player.position = Vec2::new(
                rng.random_range(0.0..SPAWN_WIDTH),
                rng.random_range(0.0..SPAWN_HEIGHT),
            );
        }
        self.current_game = Some(game);
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// Store a score pushed by the display. Returns false when the player is
    /// gone or no round is running.
    pub fn record_score(&mut self, id: PlayerId, score: i32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.score = score;
                true
            },
            None => false,
        }
    }

    /// Freeze the round and copy final scores into the roster. The returned
    /// results are what every connection receives.
    pub fn finish_round(&mut self, mut results: RoundResultsMsg) -> Result<RoundResultsMsg, SessionError> {
        if self.phase != GamePhase::Playing {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "finish a round",
            });
        }
        for entry in &results.results {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == entry.player_id) {
                player.score = entry.score;
            }
        }
        if results.game.is_none() {
            results.game = self.current_game;
        }
        self.phase = GamePhase::Results;
        Ok(results)
    }

    pub fn return_to_lobby(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::Results {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "return to the lobby",
            });
        }
        self.reset_to_lobby();
        Ok(())
    }

    /// Drop whatever round is in progress. Returns true if there was one.
    pub fn abandon_round(&mut self) -> bool {
        if self.phase == GamePhase::Lobby {
            return false;
        }
        self.reset_to_lobby();
        true
    }

    fn reset_to_lobby(&mut self) {
        self.current_game = None;
        self.phase = GamePhase::Lobby;
        self.all_ready = false;
        for player in &mut self.players {
            player.score = 0;
            player.is_ready = false;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            players: self.players.clone(),
            current_game: self.current_game,
            phase: self.phase,
            round_duration_secs: self.settings.round_duration_secs,
        }
    }
}

fn clean_name(raw: &str) -> Option<String> {
    let name: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_LEN)
        .collect();
    let name = name.trim_end().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use couchparty_core::ranking::RankedEntry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session_with(n: usize) -> Session {
        let mut session = Session::new(SessionSettings::default());
        for id in 1..=n as PlayerId {
            session.join(id, None).unwrap();
        }
        session
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn colors_and_default_names_follow_join_order() {
        let session = session_with(3);
        let players = session.players();
        assert_eq!(players[0].name, "Player 1");
        assert_eq!(players[2].name, "Player 3");
        for (i, p) in players.iter().enumerate() {
            assert_eq!(p.color, PlayerColor::PALETTE[i]);
            assert_eq!(p.score, 0);
            assert!(!p.is_ready);
        }
    }

    #[test]
    fn ninth_join_is_rejected() {
        let mut session = session_with(8);
        let err = session.join(9, Some("Late")).unwrap_err();
        assert_eq!(err, SessionError::CapacityExceeded { max_players: 8 });
        assert_eq!(err.to_string(), "Game is full!");
        assert_eq!(session.players().len(), 8);
    }

    #[test]
    fn names_are_trimmed_and_capped() {
        let mut session = Session::new(SessionSettings::default());
        let p = session.join(1, Some("  Ana  ")).unwrap();
        assert_eq!(p.name, "Ana");
        let long = "x".repeat(50);
        let p = session.join(2, Some(&long)).unwrap();
        assert_eq!(p.name.chars().count(), MAX_NAME_LEN);
        let p = session.join(3, Some("   ")).unwrap();
        assert_eq!(p.name, "Player 3");
    }

    #[test]
    fn repeated_join_returns_existing_record() {
        let mut session = Session::new(SessionSettings::default());
        let first = session.join(1, Some("Ana")).unwrap();
        let again = session.join(1, Some("Other")).unwrap();
        assert_eq!(first, again);
        assert_eq!(session.players().len(), 1);
    }

    #[test]
    fn color_reflects_roster_size_after_departures() {
        let mut session = session_with(2);
        session.remove(1);
        let p = session.join(3, None).unwrap();
        assert_eq!(p.color, PlayerColor::PALETTE[1]);
        assert_eq!(p.name, "Player 2");
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut session = session_with(1);
        assert!(session.remove(42).is_none());
        assert_eq!(session.players().len(), 1);
    }

    #[test]
    fn all_ready_fires_once_per_transition() {
        let mut session = session_with(2);
        session.toggle_ready(1);
        assert!(!session.refresh_all_ready());
        session.toggle_ready(2);
        assert!(session.refresh_all_ready());
        // Still all ready: no second signal.
        assert!(!session.refresh_all_ready());

        session.toggle_ready(1);
        assert!(!session.refresh_all_ready());
        session.toggle_ready(1);
        assert!(session.refresh_all_ready());
    }

    #[test]
    fn toggling_one_player_never_fires_while_another_is_unready() {
        let mut session = session_with(3);
        session.toggle_ready(1);
        session.toggle_ready(2);
        for _ in 0..4 {
            session.toggle_ready(1);
            assert!(!session.refresh_all_ready());
        }
    }

    #[test]
    fn empty_roster_is_never_all_ready() {
        let mut session = Session::new(SessionSettings::default());
        assert!(!session.refresh_all_ready());
    }

    #[test]
    fn begin_round_requires_players_and_lobby() {
        let mut empty = Session::new(SessionSettings::default());
        assert_eq!(
            empty.begin_round(GameKind::Racing, &mut rng()),
            Err(SessionError::NoPlayers)
        );

        let mut session = session_with(2);
        session.begin_round(GameKind::Battle, &mut rng()).unwrap();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.current_game(), Some(GameKind::Battle));
        for p in session.players() {
            assert!((0.0..SPAWN_WIDTH).contains(&p.position.x));
            assert!((0.0..SPAWN_HEIGHT).contains(&p.position.y));
        }
        assert!(matches!(
            session.begin_round(GameKind::Quiz, &mut rng()),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn full_round_lifecycle_resets_players() {
        let mut session = session_with(2);
        session.toggle_ready(1);
        session.toggle_ready(2);
        session.begin_round(GameKind::Quiz, &mut rng()).unwrap();
        assert!(session.record_score(2, 150));
        assert!(!session.record_score(99, 10));

        let results = RoundResultsMsg {
            game: None,
            results: vec![RankedEntry {
                rank: 1,
                player_id: 2,
                name: "Player 2".into(),
                color: PlayerColor::PALETTE[1],
                score: 290,
            }],
        };
        let results = session.finish_round(results).unwrap();
        assert_eq!(results.game, Some(GameKind::Quiz));
        assert_eq!(session.phase(), GamePhase::Results);
        assert_eq!(session.player(2).unwrap().score, 290);
        assert!(!session.record_score(2, 1));

        session.return_to_lobby().unwrap();
        assert_eq!(session.phase(), GamePhase::Lobby);
        assert_eq!(session.current_game(), None);
        assert!(session.players().iter().all(|p| p.score == 0 && !p.is_ready));
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut session = session_with(1);
        assert!(session.return_to_lobby().is_err());
        let results = RoundResultsMsg {
            game: None,
            results: Vec::new(),
        };
        assert!(session.finish_round(results).is_err());
        assert!(!session.abandon_round());
    }

    #[test]
    fn abandon_round_returns_to_lobby() {
        let mut session = session_with(1);
        session.begin_round(GameKind::Racing, &mut rng()).unwrap();
        assert!(session.abandon_round());
        assert_eq!(session.phase(), GamePhase::Lobby);
        assert_eq!(session.current_game(), None);
    }

    #[test]
    fn snapshot_reflects_state() {
        let session = session_with(2);
        let snap = session.snapshot();
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.phase, GamePhase::Lobby);
        assert_eq!(snap.current_game, None);
        assert_eq!(snap.round_duration_secs, 60);
    }
}
