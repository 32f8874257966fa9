pub mod game_trait;
pub mod net;
pub mod physics;
pub mod player;
pub mod ranking;
pub mod render;
pub mod session;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::time::{Duration, Instant};

    use crate::game_trait::{GameEvent, MiniGame, Motion};
    use crate::net::messages::{ActionKind, ActionMsg};
    use crate::physics::{PlayField, Vec2};
    use crate::player::{Player, PlayerColor, PlayerId};
    use crate::render::Frame;

    /// Duration of one simulation tick at 60 Hz.
    pub const TICK: Duration = Duration::from_micros(16_667);

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                Player::new(
                    i as PlayerId + 1,
                    format!("Player{}", i + 1),
                    PlayerColor::for_join_index(i),
                )
            })
            .collect()
    }

    /// The field every game test uses unless it needs something special.
    pub fn test_field() -> PlayField {
        PlayField::new(1280.0, 720.0)
    }

    /// Run `n` ticks starting at `start`, returning all emitted events and the
    /// instant after the last tick.
    pub fn run_ticks(
        game: &mut dyn MiniGame,
        n: usize,
        start: Instant,
    ) -> (Vec<GameEvent>, Instant) {
        let mut now = start;
        let mut all_events = Vec::new();
        for _ in 0..n {
            now += TICK;
            all_events.extend(game.update(now));
        }
        (all_events, now)
    }

    // ================================================================
    // Mini-game contract checks
    // ================================================================
    // Every rule set runs these from its own #[cfg(test)] module.

    /// init() must create one zero score per player, in roster order.
    pub fn contract_init_tracks_every_player(game: &mut dyn MiniGame, player_count: usize) {
        let players = make_players(player_count);
        game.init(&players, &test_field());
        let scores = game.scores();
        assert_eq!(scores.len(), player_count, "one score per player");
        for (score, player) in scores.iter().zip(&players) {
            assert_eq!(score.player_id, player.id, "scores must follow roster order");
            assert_eq!(score.score, 0, "scores start at zero");
        }
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return bytes after init"
        );
    }

    /// Input for a player the game does not know must be a no-op.
    pub fn contract_unknown_player_is_ignored(game: &mut dyn MiniGame) {
        let players = make_players(2);
        game.init(&players, &test_field());
        let before = game.serialize_state();
        let ghost: PlayerId = 9_999;
        game.apply_motion(ghost, Motion::Tilt(Vec2::new(1.0, 1.0)));
        let now = Instant::now();
        for kind in [
            ActionKind::Boost,
            ActionKind::Attack,
            ActionKind::Special,
            ActionKind::Answer,
        ] {
            let action = ActionMsg {
                kind,
                answer: Some("A".to_string()),
            };
            assert!(
                game.apply_action(ghost, &action, now).is_empty(),
                "unknown player must not produce events"
            );
        }
        assert_eq!(before, game.serialize_state(), "unknown player must not change state");
        assert!(game.scores().iter().all(|s| s.player_id != ghost));
    }

    /// player_left() must drop the player from scores.
    pub fn contract_player_left_cleanup(
        game: &mut dyn MiniGame,
        player_id: PlayerId,
        player_count: usize,
    ) {
        game.player_left(player_id);
        let scores = game.scores();
        assert_eq!(scores.len(), player_count - 1);
        assert!(scores.iter().all(|s| s.player_id != player_id));
    }

    /// render() must title the frame and draw something.
    pub fn contract_render_produces_frame(game: &dyn MiniGame) -> Frame {
        let mut frame = Frame::default();
        game.render(&mut frame);
        assert!(!frame.title.is_empty(), "frame must carry the game title");
        assert!(!frame.shapes.is_empty(), "frame must draw shapes");
        frame
    }
}
