//! Sequences the lineup, hands each game the available rewards and records
//! what it grants.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{Reward, RewardPool};
use crate::config::{ConfigError, HuntConfig};
use crate::games::{ActiveGame, GameKind};
use crate::rng::RngBundle;

/// Where the hunt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum GameStep {
    Start,
    Playing { stage: usize, kind: GameKind },
    /// Showing the reward won at `stage`.
    Reveal { stage: usize },
    Final,
}

impl fmt::Display for GameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Playing { stage, kind } => write!(f, "game {} ({kind})", stage + 1),
            Self::Reveal { stage } => write!(f, "reveal {}", stage + 1),
            Self::Final => f.write_str("final"),
        }
    }
}

/// An external trigger fired from a step that does not accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} during {step}")]
pub struct StepError {
    pub action: &'static str,
    pub step: GameStep,
}

/// Read-only projection for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntSnapshot {
    pub step: GameStep,
    pub won: Vec<Reward>,
    pub available: Vec<Reward>,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: HuntConfig,
    bundle: RngBundle,
    pool: RewardPool,
    step: GameStep,
    active: Option<ActiveGame>,
}

impl Orchestrator {
    /// Validate `config` and stand at the start screen.
    ///
    /// # Errors
    ///
    /// Returns the configuration problem that would make the hunt unfinishable.
    pub fn new(config: HuntConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = RewardPool::new(&config.catalog);
        Ok(Self {
            config,
            bundle: RngBundle::from_user_seed(0),
            pool,
            step: GameStep::Start,
            active: None,
        })
    }

    /// Seed the random streams handed to each game.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.bundle = RngBundle::from_user_seed(seed);
        self
    }

    /// Leave the start screen for the first game.
    ///
    /// # Errors
    ///
    /// Rejected outside the start step.
    pub fn begin(&mut self) -> Result<GameKind, StepError> {
        if self.step != GameStep::Start {
            return Err(self.wrong_step("begin"));
        }
        self.pool = RewardPool::new(&self.config.catalog);
        log::info!(
            "hunt begins: {} games, {} rewards, seed {}",
            self.config.lineup.len(),
            self.pool.available().len(),
            self.bundle.seed()
        );
        Ok(self.mount(0))
    }

    /// Resolve a game's completion index against the rewards it was handed
    /// and move to that game's reveal.
    ///
    /// # Errors
    ///
    /// Rejected when no game is being played.
    ///
    /// # Panics
    ///
    /// Panics when `index` is outside the rewards handed to the running game.
    pub fn complete_game(&mut self, index: usize) -> Result<Reward, StepError> {
        let GameStep::Playing { stage, kind } = self.step else {
            return Err(self.wrong_step("complete a game"));
        };
        let handed = self
            .active
            .as_ref()
            .map_or_else(|| self.pool.snapshot(), |game| game.rewards().to_vec());
        assert!(
            index < handed.len(),
            "{kind} completed with index {index} but was handed {} rewards",
            handed.len()
        );
        let name = handed[index].name.clone();
        let Some(reward) = self.pool.award(&name).cloned() else {
            panic!("{kind} granted {name}, which is no longer available");
        };

        if let Some(mut game) = self.active.take() {
            let dropped = game.deactivate();
            if dropped > 0 {
                log::debug!("{kind} unmounted with {dropped} pending effects cancelled");
            }
        }
        self.step = GameStep::Reveal { stage };
        log::info!(
            "game {} ({kind}) granted {} {}; {} won, {} left",
            stage + 1,
            reward.icon,
            reward.name,
            self.pool.won().len(),
            self.pool.available().len()
        );
        Ok(reward)
    }

    /// Leave a reveal for the next game, or for the final screen after the last.
    ///
    /// # Errors
    ///
    /// Rejected outside a reveal step.
    pub fn advance(&mut self) -> Result<GameStep, StepError> {
        let GameStep::Reveal { stage } = self.step else {
            return Err(self.wrong_step("advance"));
        };
        let next = stage + 1;
        if next < self.config.lineup.len() {
            self.mount(next);
        } else {
            self.step = GameStep::Final;
            log::info!(
                "hunt complete: {}",
                self.pool
                    .won()
                    .iter()
                    .map(|reward| reward.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(self.step)
    }

    /// Advance the running game's clock and route its completion, if any.
    /// Returns the reward when the game completed during this tick.
    pub fn tick(&mut self, elapsed: Duration) -> Option<Reward> {
        let game = self.active.as_mut()?;
        game.tick(elapsed);
        let index = game.take_completion()?;
        match self.complete_game(index) {
            Ok(reward) => Some(reward),
            Err(err) => {
                log::warn!("dropping completion {index}: {err}");
                None
            }
        }
    }

    /// Back to the start screen with a full pool and fresh random streams.
    pub fn restart(&mut self) {
        if let Some(mut game) = self.active.take() {
            game.deactivate();
        }
        self.bundle = self.bundle.next_run();
        self.pool = RewardPool::new(&self.config.catalog);
        self.step = GameStep::Start;
        log::info!("hunt restarted (run {})", self.bundle.run());
    }

    #[must_use]
    pub const fn step(&self) -> GameStep {
        self.step
    }

    #[must_use]
    pub const fn active_game(&self) -> Option<&ActiveGame> {
        self.active.as_ref()
    }

    pub fn active_game_mut(&mut self) -> Option<&mut ActiveGame> {
        self.active.as_mut()
    }

    #[must_use]
    pub fn snapshot(&self) -> HuntSnapshot {
        HuntSnapshot {
            step: self.step,
            won: self.pool.won().to_vec(),
            available: self.pool.available().to_vec(),
        }
    }

    /// The reward the reveal step shows.
    #[must_use]
    pub fn latest_reward(&self) -> Option<&Reward> {
        self.pool.latest()
    }

    #[must_use]
    pub fn won(&self) -> &[Reward] {
        self.pool.won()
    }

    #[must_use]
    pub fn available(&self) -> &[Reward] {
        self.pool.available()
    }

    #[must_use]
    pub const fn pool(&self) -> &RewardPool {
        &self.pool
    }

    #[must_use]
    pub const fn config(&self) -> &HuntConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.bundle.seed()
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.step == GameStep::Final
    }

    fn mount(&mut self, stage: usize) -> GameKind {
        let kind = self.config.lineup.games()[stage];
        let rng = self.bundle.stream(kind, stage);
        let game = ActiveGame::activate(kind, self.pool.snapshot(), &self.config.tuning, rng);
        log::info!(
            "game {} of {}: {}",
            stage + 1,
            self.config.lineup.len(),
            kind.label()
        );
        self.active = Some(game);
        self.step = GameStep::Playing { stage, kind };
        kind
    }

    const fn wrong_step(&self, action: &'static str) -> StepError {
        StepError {
            action,
            step: self.step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lineup;

    fn hunt() -> Orchestrator {
        Orchestrator::new(HuntConfig::default()).unwrap().with_seed(42)
    }

    #[test]
    fn triggers_only_fire_from_their_step() {
        let mut hunt = hunt();
        assert_eq!(
            hunt.advance(),
            Err(StepError {
                action: "advance",
                step: GameStep::Start
            })
        );
        assert!(hunt.complete_game(0).is_err());
        assert_eq!(hunt.begin(), Ok(GameKind::WheelSpin));
        assert!(hunt.begin().is_err());
        assert!(hunt.advance().is_err());
    }

    #[test]
    fn completion_moves_reward_and_unmounts_game() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        let reward = hunt.complete_game(3).unwrap();
        assert_eq!(reward.name, "Ring");
        assert_eq!(hunt.step(), GameStep::Reveal { stage: 0 });
        assert_eq!(hunt.latest_reward(), Some(&reward));
        assert!(hunt.active_game().is_none());
        assert_eq!(hunt.available().len(), 5);
        assert!(hunt.available().iter().all(|r| r.name != "Ring"));
        assert!(hunt.complete_game(0).is_err());
    }

    #[test]
    fn next_game_only_sees_remaining_rewards() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        hunt.complete_game(0).unwrap();
        assert_eq!(
            hunt.advance(),
            Ok(GameStep::Playing {
                stage: 1,
                kind: GameKind::MemoryMatch
            })
        );
        let handed = hunt.active_game().unwrap().rewards();
        assert_eq!(handed.len(), 5);
        assert!(handed.iter().all(|r| r.name != "Chocolate"));

        // Index 0 now resolves to the first still-available reward.
        assert_eq!(hunt.complete_game(0).unwrap().name, "Lipstick");
    }

    #[test]
    #[should_panic(expected = "was handed 6 rewards")]
    fn out_of_range_completion_is_a_contract_violation() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        let _ = hunt.complete_game(6);
    }

    #[test]
    fn last_reveal_advances_to_final() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        for stage in 0..3 {
            hunt.complete_game(0).unwrap();
            let next = hunt.advance().unwrap();
            if stage < 2 {
                assert!(matches!(next, GameStep::Playing { .. }));
            }
        }
        assert!(hunt.is_final());
        let snapshot = hunt.snapshot();
        assert_eq!(snapshot.step, GameStep::Final);
        assert_eq!(snapshot.won.len(), 3);
        assert_eq!(snapshot.available.len(), 3);
        assert!(hunt.pool().partitions(&hunt.config().catalog));
        assert!(hunt.advance().is_err());
    }

    #[test]
    fn restart_returns_to_start_with_full_pool() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        hunt.complete_game(1).unwrap();
        hunt.restart();
        assert_eq!(hunt.step(), GameStep::Start);
        assert!(hunt.won().is_empty());
        assert_eq!(hunt.available().len(), 6);
        assert!(hunt.begin().is_ok());
    }

    #[test]
    fn tick_routes_a_completion_once() {
        let mut hunt = hunt();
        assert_eq!(hunt.tick(Duration::from_secs(5)), None);
        hunt.begin().unwrap();
        let Some(ActiveGame::Wheel(wheel)) = hunt.active_game_mut() else {
            panic!("gift box opens on the wheel");
        };
        wheel.spin().unwrap();
        assert_eq!(hunt.tick(Duration::from_millis(3_999)), None);
        let reward = hunt.tick(Duration::from_millis(1)).unwrap();
        assert_eq!(hunt.step(), GameStep::Reveal { stage: 0 });
        assert_eq!(hunt.latest_reward(), Some(&reward));
        assert_eq!(hunt.tick(Duration::from_secs(5)), None);
        assert_eq!(hunt.won().len(), 1);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = HuntConfig::default().with_lineup(Lineup::new(Vec::new()));
        assert_eq!(
            Orchestrator::new(config).err(),
            Some(ConfigError::EmptyLineup)
        );
    }

    #[test]
    fn snapshot_serialises_step_tag() {
        let mut hunt = hunt();
        hunt.begin().unwrap();
        let json = serde_json::to_value(hunt.snapshot()).unwrap();
        assert_eq!(json["step"]["step"], "playing");
        assert_eq!(json["step"]["kind"], "wheel-spin");
        assert_eq!(json["won"].as_array().unwrap().len(), 0);
    }
}
