//! Wheel spin: one spin, the wedge under the pointer is the reward.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::GameRng;
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelTuning {
    #[serde(default = "WheelTuning::default_max_segments")]
    pub max_segments: usize,
    #[serde(default = "WheelTuning::default_min_turns")]
    pub min_turns: u32,
    #[serde(default = "WheelTuning::default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "WheelTuning::default_spin_ms")]
    pub spin_ms: u64,
}

impl WheelTuning {
    const fn default_max_segments() -> usize {
        6
    }

    const fn default_min_turns() -> u32 {
        5
    }

    const fn default_max_turns() -> u32 {
        10
    }

    const fn default_spin_ms() -> u64 {
        4_000
    }
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            max_segments: Self::default_max_segments(),
            min_turns: Self::default_min_turns(),
            max_turns: Self::default_max_turns(),
            spin_ms: Self::default_spin_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelState {
    Idle,
    Spinning,
    Settled { segment: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WheelTask {
    Settle { segment: usize },
}

/// Wedge under the fixed pointer once the wheel stops `final_angle` degrees
/// past a whole number of turns.
#[must_use]
pub fn segment_for_angle(final_angle: f64, segments: usize) -> usize {
    let segments = segments.max(1);
    let segment_angle = 360.0 / segments as f64;
    let normalized = (360.0 - final_angle.rem_euclid(360.0)).rem_euclid(360.0);
    let index = (normalized / segment_angle).floor() as usize;
    index.min(segments - 1)
}

#[derive(Debug, Clone)]
pub struct WheelSpin {
    rewards: Vec<Reward>,
    segments: usize,
    tuning: WheelTuning,
    state: WheelState,
    rotation: f64,
    final_angle: Option<f64>,
    rng: GameRng,
    timers: Scheduler<WheelTask>,
    completion: Completion,
}

impl WheelSpin {
    /// Start the spin. Returns the total rotation in degrees the wheel
    /// animates to.
    ///
    /// # Errors
    ///
    /// Rejected while a spin is in flight or after the wheel has settled.
    pub fn spin(&mut self) -> Result<f64, Rejected> {
        match self.state {
            WheelState::Spinning => return Err(Rejected::Busy),
            WheelState::Settled { .. } => return Err(Rejected::Finished),
            WheelState::Idle => {}
        }
        let min_turns = self.tuning.min_turns;
        let turns = self.rng.gen_range(min_turns..=self.tuning.max_turns.max(min_turns));
        let final_angle = self.rng.r#gen::<f64>() * 360.0;
        self.rotation += f64::from(turns) * 360.0 + final_angle;
        self.final_angle = Some(final_angle);
        let segment = segment_for_angle(final_angle, self.segments);
        self.state = WheelState::Spinning;
        self.timers.after(
            Duration::from_millis(self.tuning.spin_ms),
            WheelTask::Settle { segment },
        );
        log::debug!("wheel spinning to {:.1} degrees", self.rotation);
        Ok(self.rotation)
    }

    #[must_use]
    pub const fn state(&self) -> WheelState {
        self.state
    }

    /// Accumulated rotation in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Offset past whole turns the current spin stops at.
    #[must_use]
    pub const fn final_angle(&self) -> Option<f64> {
        self.final_angle
    }

    /// Rewards painted on the wheel, one per wedge.
    #[must_use]
    pub fn segments(&self) -> &[Reward] {
        &self.rewards[..self.segments]
    }

    /// Reward under the pointer once settled.
    #[must_use]
    pub fn landed(&self) -> Option<&Reward> {
        match self.state {
            WheelState::Settled { segment } => self.rewards.get(segment),
            _ => None,
        }
    }

    fn on_timer(&mut self, task: WheelTask) {
        match task {
            WheelTask::Settle { segment } => {
                self.state = WheelState::Settled { segment };
                log::debug!("wheel settled on segment {segment}");
                self.completion.fire(segment, self.rewards.len());
            }
        }
    }
}

impl MiniGame for WheelSpin {
    type Tuning = WheelTuning;

    fn activate(rewards: Vec<Reward>, tuning: &WheelTuning, rng: GameRng) -> Self {
        let segments = rewards.len().min(tuning.max_segments.max(1));
        Self {
            rewards,
            segments,
            tuning: tuning.clone(),
            state: WheelState::Idle,
            rotation: 0.0,
            final_angle: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::WheelSpin
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
        matches!(self.state, WheelState::Settled { .. })
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
