//! Hunt configuration: catalog, lineup and per-game tuning.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::RewardCatalog;
use crate::games::balloon::BalloonTuning;
use crate::games::memory::MemoryTuning;
use crate::games::puzzle::PuzzleTuning;
use crate::games::quiz::QuizTuning;
use crate::games::scramble::ScrambleTuning;
use crate::games::scratch::ScratchTuning;
use crate::games::tap::TapTuning;
use crate::games::tictactoe::TicTacToeTuning;
use crate::games::wheel::WheelTuning;
use crate::games::GameKind;

const DEFAULT_HUNT_DATA: &str = include_str!("../data/hunt.json");

/// Largest slide-puzzle edge the breadth-first solver handles.
pub const MAX_PUZZLE_SIZE: usize = 3;

/// Tuning for every module, keyed by game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameTuning {
    #[serde(default)]
    pub wheel: WheelTuning,
    #[serde(default)]
    pub memory: MemoryTuning,
    #[serde(default)]
    pub balloon: BalloonTuning,
    #[serde(default)]
    pub puzzle: PuzzleTuning,
    #[serde(default)]
    pub scramble: ScrambleTuning,
    #[serde(default)]
    pub quiz: QuizTuning,
    #[serde(default)]
    pub scratch: ScratchTuning,
    #[serde(default)]
    pub tap: TapTuning,
    #[serde(default)]
    pub tictactoe: TicTacToeTuning,
}

/// Ordered mini-games played in one hunt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lineup {
    games: Vec<GameKind>,
}

impl Lineup {
    /// Names accepted by [`Lineup::named`].
    pub const NAMES: [&'static str; 3] = ["gift-box", "extended", "arcade"];

    #[must_use]
    pub const fn new(games: Vec<GameKind>) -> Self {
        Self { games }
    }

    /// The three-game gift box.
    #[must_use]
    pub fn gift_box() -> Self {
        Self::new(vec![
            GameKind::WheelSpin,
            GameKind::MemoryMatch,
            GameKind::PopReveal,
        ])
    }

    #[must_use]
    pub fn extended() -> Self {
        Self::new(vec![
            GameKind::WheelSpin,
            GameKind::MemoryMatch,
            GameKind::PopReveal,
            GameKind::WordUnscramble,
            GameKind::Quiz,
            GameKind::ScratchReveal,
        ])
    }

    /// The games not in the other lineups.
    #[must_use]
    pub fn arcade() -> Self {
        Self::new(vec![
            GameKind::SlidePuzzle,
            GameKind::TimedTap,
            GameKind::TicTacToe,
        ])
    }

    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "gift-box" => Some(Self::gift_box()),
            "extended" => Some(Self::extended()),
            "arcade" => Some(Self::arcade()),
            _ => None,
        }
    }

    #[must_use]
    pub fn games(&self) -> &[GameKind] {
        &self.games
    }

    #[must_use]
    pub fn get(&self, stage: usize) -> Option<GameKind> {
        self.games.get(stage).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for Lineup {
    fn default() -> Self {
        Self::gift_box()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntConfig {
    #[serde(default = "RewardCatalog::gift_box")]
    pub catalog: RewardCatalog,
    #[serde(default)]
    pub lineup: Lineup,
    #[serde(default)]
    pub tuning: GameTuning,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            catalog: RewardCatalog::gift_box(),
            lineup: Lineup::gift_box(),
            tuning: GameTuning::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("reward catalog is empty")]
    EmptyCatalog,
    #[error("reward name {0:?} appears more than once")]
    DuplicateReward(String),
    #[error("lineup is empty")]
    EmptyLineup,
    #[error("lineup has {games} games but the catalog only {rewards} rewards")]
    LineupExceedsCatalog { games: usize, rewards: usize },
    #[error("{game}: {reason}")]
    Unwinnable { game: GameKind, reason: String },
}

impl ConfigError {
    fn unwinnable(game: GameKind, reason: impl Into<String>) -> Self {
        Self::Unwinnable {
            game,
            reason: reason.into(),
        }
    }
}

impl HuntConfig {
    /// Parse the embedded default hunt, falling back to compiled defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_HUNT_DATA).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a hunt configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_lineup(mut self, lineup: Lineup) -> Self {
        self.lineup = lineup;
        self
    }

    /// Check that every configured game can be won and the pool never runs dry.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some(name) = self.catalog.duplicate_name() {
            return Err(ConfigError::DuplicateReward(name.to_string()));
        }
        if self.lineup.is_empty() {
            return Err(ConfigError::EmptyLineup);
        }
        if self.lineup.len() > self.catalog.len() {
            return Err(ConfigError::LineupExceedsCatalog {
                games: self.lineup.len(),
                rewards: self.catalog.len(),
            });
        }
        for &game in self.lineup.games() {
            self.validate_game(game)?;
        }
        Ok(())
    }

    fn validate_game(&self, game: GameKind) -> Result<(), ConfigError> {
        let tuning = &self.tuning;
        match game {
            GameKind::WheelSpin => {
                if tuning.wheel.max_segments == 0 {
                    return Err(ConfigError::unwinnable(game, "wheel has no segments"));
                }
            }
            GameKind::MemoryMatch => {
                if tuning.memory.symbols.is_empty() {
                    return Err(ConfigError::unwinnable(game, "no cards to deal"));
                }
            }
            GameKind::PopReveal => {
                if tuning.balloon.balloons == 0 {
                    return Err(ConfigError::unwinnable(game, "no balloons"));
                }
            }
            GameKind::SlidePuzzle => {
                let size = tuning.puzzle.size;
                if !(2..=MAX_PUZZLE_SIZE).contains(&size) {
                    return Err(ConfigError::unwinnable(
                        game,
                        format!("board size {size} outside 2..={MAX_PUZZLE_SIZE}"),
                    ));
                }
            }
            GameKind::WordUnscramble => {
                if tuning.scramble.words.is_empty() {
                    return Err(ConfigError::unwinnable(game, "word list is empty"));
                }
            }
            GameKind::Quiz => {
                if tuning.quiz.questions.is_empty() {
                    return Err(ConfigError::unwinnable(game, "no questions"));
                }
                if let Some(question) = tuning
                    .quiz
                    .questions
                    .iter()
                    .find(|q| q.correct >= q.options.len())
                {
                    return Err(ConfigError::unwinnable(
                        game,
                        format!("answer for {:?} is not one of its options", question.question),
                    ));
                }
            }
            GameKind::ScratchReveal => {
                let scratch = &tuning.scratch;
                if scratch.width == 0 || scratch.height == 0 {
                    return Err(ConfigError::unwinnable(game, "card has no area"));
                }
                if !(scratch.threshold > 0.0 && scratch.threshold <= 1.0) {
                    return Err(ConfigError::unwinnable(
                        game,
                        format!("threshold {} outside (0, 1]", scratch.threshold),
                    ));
                }
                if scratch.brush_radius <= 0.0 {
                    return Err(ConfigError::unwinnable(game, "brush has no size"));
                }
            }
            GameKind::TimedTap => {
                let tap = &tuning.tap;
                if tap.duration_s == 0 {
                    return Err(ConfigError::unwinnable(game, "countdown is zero"));
                }
                if u64::from(tap.target) > tap.reachable_score() {
                    return Err(ConfigError::unwinnable(
                        game,
                        format!(
                            "tap target {} above the {} hearts spawned in {}s",
                            tap.target,
                            tap.reachable_score(),
                            tap.duration_s
                        ),
                    ));
                }
            }
            GameKind::TicTacToe => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_hunt_matches_compiled_defaults() {
        let config = HuntConfig::load_from_static();
        assert_eq!(config, HuntConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = HuntConfig::from_json(r#"{"lineup": ["quiz", "tic-tac-toe"]}"#).unwrap();
        assert_eq!(config.lineup.games(), &[GameKind::Quiz, GameKind::TicTacToe]);
        assert_eq!(config.catalog.len(), 6);
        assert_eq!(config.tuning.quiz.advance_ms, 1_500);
        assert_eq!(config.tuning.wheel.spin_ms, 4_000);
    }

    #[test]
    fn built_in_lineups_cover_every_game() {
        let mut seen: Vec<GameKind> = Lineup::NAMES
            .iter()
            .filter_map(|name| Lineup::named(name))
            .flat_map(|lineup| lineup.games().to_vec())
            .collect();
        seen.sort_by_key(|kind| kind.key());
        seen.dedup();
        assert_eq!(seen.len(), GameKind::ALL.len());
        assert_eq!(Lineup::named("marathon"), None);
    }

    #[test]
    fn validate_rejects_structural_problems() {
        let mut config = HuntConfig::default();
        config.catalog = RewardCatalog::new(Vec::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyCatalog));

        let mut config = HuntConfig::default();
        config.lineup = Lineup::new(Vec::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyLineup));

        let mut config = HuntConfig::default();
        config.catalog = RewardCatalog::new(RewardCatalog::gift_box().rewards()[..2].to_vec());
        assert_eq!(
            config.validate(),
            Err(ConfigError::LineupExceedsCatalog {
                games: 3,
                rewards: 2
            })
        );
    }

    #[test]
    fn validate_rejects_unwinnable_tuning_only_for_games_in_the_lineup() {
        let mut config = HuntConfig::default();
        config.tuning.scratch.threshold = 1.5;
        assert!(config.validate().is_ok());

        let config = config.with_lineup(Lineup::extended());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unwinnable {
                game: GameKind::ScratchReveal,
                ..
            })
        ));

        let mut config = HuntConfig::default().with_lineup(Lineup::extended());
        config.tuning.quiz.questions[0].correct = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unwinnable {
                game: GameKind::Quiz,
                ..
            })
        ));
    }
}
