use std::collections::HashMap;

use couchparty_core::game_trait::MiniGame;
use couchparty_core::session::GameKind;

/// Factory function type: creates a fresh game instance for one round.
type GameFactory = fn() -> Box<dyn MiniGame>;

/// Maps game kinds to the rule sets compiled into this display.
#[derive(Default)]
pub struct GameRegistry {
    factories: HashMap<GameKind, GameFactory>,
}

impl GameRegistry {
    pub fn register(&mut self, kind: GameKind, factory: GameFactory) {
        self.factories.insert(kind, factory);
    }

    pub fn create(&self, kind: GameKind) -> Option<Box<dyn MiniGame>> {
        self.factories.get(&kind).map(|f| f())
    }

    pub fn contains(&self, kind: GameKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn available(&self) -> Vec<GameKind> {
        GameKind::ALL
            .into_iter()
            .filter(|k| self.factories.contains_key(k))
            .collect()
    }
}

/// Registry populated with every game enabled by cargo features.
pub fn create_registry() -> GameRegistry {
    let mut registry = GameRegistry::default();
    #[cfg(feature = "racing")]
    registry.register(GameKind::Racing, || {
        Box::new(couchparty_racing::TiltRacing::new())
    });
    #[cfg(feature = "battle")]
    registry.register(GameKind::Battle, || {
        Box::new(couchparty_battle::BattleArena::new())
    });
    #[cfg(feature = "quiz")]
    registry.register(GameKind::Quiz, || Box::new(couchparty_quiz::QuickQuiz::new()));
    registry
}
