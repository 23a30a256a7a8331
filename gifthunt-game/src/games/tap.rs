//! Timed tap: hearts float up the play area; tap enough before time runs out.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapTuning {
    #[serde(default = "TapTuning::default_target")]
    pub target: u32,
    #[serde(default = "TapTuning::default_duration_s")]
    pub duration_s: u32,
    #[serde(default = "TapTuning::default_spawn_ms")]
    pub spawn_ms: u64,
    #[serde(default = "TapTuning::default_frame_ms")]
    pub frame_ms: u64,
    /// Drift per frame in pixels, drawn from `min_speed..max_speed`.
    #[serde(default = "TapTuning::default_min_speed")]
    pub min_speed: f64,
    #[serde(default = "TapTuning::default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "TapTuning::default_area_width")]
    pub area_width: f64,
    #[serde(default = "TapTuning::default_area_height")]
    pub area_height: f64,
    #[serde(default = "TapTuning::default_heart_size")]
    pub heart_size: f64,
    #[serde(default = "TapTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl TapTuning {
    /// Hearts spawned before the countdown runs out, the best score a round allows.
    ///
    /// A spawn due on the final second loses to the countdown.
    #[must_use]
    pub fn reachable_score(&self) -> u64 {
        (u64::from(self.duration_s) * 1_000).saturating_sub(1) / self.spawn_ms.max(1)
    }

    const fn default_target() -> u32 {
        5
    }

    const fn default_duration_s() -> u32 {
        10
    }

    const fn default_spawn_ms() -> u64 {
        1_000
    }

    const fn default_frame_ms() -> u64 {
        16
    }

    const fn default_min_speed() -> f64 {
        2.0
    }

    const fn default_max_speed() -> f64 {
        4.0
    }

    const fn default_area_width() -> f64 {
        320.0
    }

    const fn default_area_height() -> f64 {
        400.0
    }

    const fn default_heart_size() -> f64 {
        40.0
    }

    const fn default_reveal_ms() -> u64 {
        1_500
    }
}

impl Default for TapTuning {
    fn default() -> Self {
        Self {
            target: Self::default_target(),
            duration_s: Self::default_duration_s(),
            spawn_ms: Self::default_spawn_ms(),
            frame_ms: Self::default_frame_ms(),
            min_speed: Self::default_min_speed(),
            max_speed: Self::default_max_speed(),
            area_width: Self::default_area_width(),
            area_height: Self::default_area_height(),
            heart_size: Self::default_heart_size(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapPhase {
    Ready,
    Running,
    /// Time ran out short of the target.
    Over { score: u32 },
    Won { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapTask {
    Countdown,
    Spawn,
    Frame,
    Reveal,
}

#[derive(Debug, Clone)]
pub struct TimedTap {
    rewards: Vec<Reward>,
    tuning: TapTuning,
    phase: TapPhase,
    hearts: Vec<Heart>,
    next_heart: u64,
    score: u32,
    time_left: u32,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<TapTask>,
    completion: Completion,
}

impl TimedTap {
    /// Start the countdown.
    ///
    /// # Errors
    ///
    /// Rejected unless the game is ready for a round.
    pub fn start(&mut self) -> Result<(), Rejected> {
        match self.phase {
            TapPhase::Ready => {}
            TapPhase::Running => return Err(Rejected::AlreadyStarted),
            TapPhase::Over { .. } => return Err(Rejected::RoundOver),
            TapPhase::Won { .. } => return Err(Rejected::Finished),
        }
        self.phase = TapPhase::Running;
        self.score = 0;
        self.time_left = self.tuning.duration_s;
        self.hearts.clear();
        self.timers.every(Duration::from_secs(1), TapTask::Countdown);
        self.timers
            .every(Duration::from_millis(self.tuning.spawn_ms.max(1)), TapTask::Spawn);
        self.timers
            .every(Duration::from_millis(self.tuning.frame_ms.max(1)), TapTask::Frame);
        Ok(())
    }

    /// Tap a heart. Returns the new score.
    ///
    /// # Errors
    ///
    /// Rejected outside a running round and for hearts no longer on screen.
    pub fn tap(&mut self, id: u64) -> Result<u32, Rejected> {
        match self.phase {
            TapPhase::Running => {}
            TapPhase::Ready => return Err(Rejected::NotStarted),
            TapPhase::Over { .. } => return Err(Rejected::RoundOver),
            TapPhase::Won { .. } => return Err(Rejected::Finished),
        }
        let Some(position) = self.hearts.iter().position(|heart| heart.id == id) else {
            let index = usize::try_from(id).unwrap_or(usize::MAX);
            if id < self.next_heart {
                return Err(Rejected::AlreadyTaken { index });
            }
            return Err(Rejected::OutOfBounds {
                index,
                len: self.hearts.len(),
            });
        };
        self.hearts.remove(position);
        self.score += 1;
        Ok(self.score)
    }

    /// Clear a lost round so it can be started again.
    ///
    /// # Errors
    ///
    /// Rejected unless the last round ended short of the target.
    pub fn retry(&mut self) -> Result<(), Rejected> {
        if !matches!(self.phase, TapPhase::Over { .. }) {
            return Err(Rejected::Busy);
        }
        self.phase = TapPhase::Ready;
        self.score = 0;
        self.time_left = self.tuning.duration_s;
        self.hearts.clear();
        Ok(())
    }

    #[must_use]
    pub const fn phase(&self) -> TapPhase {
        self.phase
    }

    #[must_use]
    pub fn hearts(&self) -> &[Heart] {
        &self.hearts
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Whole seconds left on the countdown.
    #[must_use]
    pub const fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn end_round(&mut self) {
        self.timers.cancel_where(|task| *task != TapTask::Reveal);
        self.hearts.clear();
        if self.score >= self.tuning.target {
            self.phase = TapPhase::Won { score: self.score };
            log::debug!("timed tap won with {} hearts", self.score);
            self.timers
                .after(Duration::from_millis(self.tuning.reveal_ms), TapTask::Reveal);
        } else {
            self.phase = TapPhase::Over { score: self.score };
            log::debug!(
                "timed tap round over at {}/{}",
                self.score,
                self.tuning.target
            );
        }
    }

    fn spawn(&mut self) {
        let size = self.tuning.heart_size;
        let span = (self.tuning.area_width - size).max(0.0);
        let x = self.rng.r#gen::<f64>() * span;
        let (low, high) = (self.tuning.min_speed, self.tuning.max_speed);
        let speed = if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        };
        self.hearts.push(Heart {
            id: self.next_heart,
            x,
            y: self.tuning.area_height - size,
            speed,
        });
        self.next_heart += 1;
    }

    fn on_timer(&mut self, task: TapTask) {
        match task {
            TapTask::Countdown => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    self.end_round();
                }
            }
            TapTask::Spawn => self.spawn(),
            TapTask::Frame => {
                let floor = -self.tuning.heart_size;
                for heart in &mut self.hearts {
                    heart.y -= heart.speed;
                }
                self.hearts.retain(|heart| heart.y > floor);
            }
            TapTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for TimedTap {
    type Tuning = TapTuning;

    fn activate(rewards: Vec<Reward>, tuning: &TapTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            phase: TapPhase::Ready,
            hearts: Vec::new(),
            next_heart: 0,
            score: 0,
            time_left: tuning.duration_s,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::TimedTap
    }

    fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    fn tick(&mut self, elapsed: Duration) {
        drive_timers!(self, elapsed, on_timer);
    }

    fn take_completion(&mut self) -> Option<usize> {
        self.completion.take()
    }

    fn is_won(&self) -> bool {
        matches!(self.phase, TapPhase::Won { .. })
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RewardCatalog;
    use crate::rng::CountingRng;

    fn game() -> TimedTap {
        TimedTap::activate(
            RewardCatalog::gift_box().rewards().to_vec(),
            &TapTuning::default(),
            CountingRng::new(12),
        )
    }

    fn tap_everything(game: &mut TimedTap) {
        let ids: Vec<u64> = game.hearts().iter().map(|heart| heart.id).collect();
        for id in ids {
            game.tap(id).unwrap();
        }
    }

    #[test]
    fn hearts_spawn_and_drift_upwards() {
        let mut game = game();
        assert_eq!(game.tap(0), Err(Rejected::NotStarted));
        game.start().unwrap();
        assert_eq!(game.start(), Err(Rejected::AlreadyStarted));

        game.tick(Duration::from_millis(1_000));
        assert_eq!(game.hearts().len(), 1);
        let heart = game.hearts()[0];
        assert!(heart.x >= 0.0 && heart.x < 280.0);
        assert!((2.0..4.0).contains(&heart.speed));

        game.tick(Duration::from_millis(160));
        assert!(game.hearts()[0].y < heart.y);
        assert_eq!(game.time_left(), 9);
    }

    #[test]
    fn untapped_hearts_float_away() {
        let mut game = game();
        game.start().unwrap();
        game.tick(Duration::from_millis(1_000));
        // 400 px at no less than 2 px per 16 ms frame.
        game.tick(Duration::from_millis(3_300));
        assert!(game.hearts().iter().all(|heart| heart.id != 0));
        assert_eq!(game.tap(0), Err(Rejected::AlreadyTaken { index: 0 }));
        assert_eq!(game.tap(99), Err(Rejected::OutOfBounds { index: 99, len: game.hearts().len() }));
    }

    #[test]
    fn reaching_target_by_timeout_wins() {
        let mut game = game();
        game.start().unwrap();
        for _ in 0..10 {
            game.tick(Duration::from_millis(1_000));
            if game.phase() == TapPhase::Running {
                tap_everything(&mut game);
            }
        }
        assert_eq!(game.phase(), TapPhase::Won { score: 9 });
        assert_eq!(game.tap(0), Err(Rejected::Finished));
        assert_eq!(game.take_completion(), None);

        game.tick(Duration::from_millis(1_500));
        let index = game.take_completion().unwrap();
        assert_eq!(game.granted(), game.rewards().get(index));
    }

    #[test]
    fn short_round_offers_retry() {
        let mut game = game();
        assert_eq!(game.retry(), Err(Rejected::Busy));
        game.start().unwrap();
        game.tick(Duration::from_millis(1_000));
        tap_everything(&mut game);
        game.tick(Duration::from_secs(9));
        assert_eq!(game.phase(), TapPhase::Over { score: 1 });
        assert_eq!(game.time_left(), 0);
        assert_eq!(game.start(), Err(Rejected::RoundOver));

        game.tick(Duration::from_secs(5));
        assert!(game.hearts().is_empty());
        assert_eq!(game.take_completion(), None);

        game.retry().unwrap();
        assert_eq!(game.phase(), TapPhase::Ready);
        assert_eq!(game.time_left(), 10);
        game.start().unwrap();
        assert_eq!(game.score(), 0);
    }
}
