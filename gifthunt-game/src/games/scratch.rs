//! Scratch card: drag across the foil until enough of it is gone.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScratchTuning {
    #[serde(default = "ScratchTuning::default_width")]
    pub width: u32,
    #[serde(default = "ScratchTuning::default_height")]
    pub height: u32,
    #[serde(default = "ScratchTuning::default_brush_radius")]
    pub brush_radius: f64,
    /// Cleared fraction of the foil that wins, in (0, 1].
    #[serde(default = "ScratchTuning::default_threshold")]
    pub threshold: f64,
    #[serde(default = "ScratchTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl ScratchTuning {
    const fn default_width() -> u32 {
        300
    }

    const fn default_height() -> u32 {
        200
    }

    const fn default_brush_radius() -> f64 {
        20.0
    }

    const fn default_threshold() -> f64 {
        0.5
    }

    const fn default_reveal_ms() -> u64 {
        500
    }
}

impl Default for ScratchTuning {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            brush_radius: Self::default_brush_radius(),
            threshold: Self::default_threshold(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScratchTask {
    Reveal,
}

/// Coverage mask of the foil, one flag per pixel.
#[derive(Debug, Clone)]
struct Foil {
    width: usize,
    height: usize,
    cleared: Vec<bool>,
    cleared_count: usize,
}

impl Foil {
    fn new(width: u32, height: u32) -> Self {
        let width = width as usize;
        let height = height as usize;
        Self {
            width,
            height,
            cleared: vec![false; width * height],
            cleared_count: 0,
        }
    }

    fn fraction(&self) -> f64 {
        if self.cleared.is_empty() {
            return 1.0;
        }
        self.cleared_count as f64 / self.cleared.len() as f64
    }

    /// Clear every pixel whose centre lies within `radius` of (x, y).
    fn stamp(&mut self, x: f64, y: f64, radius: f64) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let x0 = (x - radius).floor().clamp(0.0, max_x) as usize;
        let x1 = (x + radius).ceil().clamp(0.0, max_x) as usize;
        let y0 = (y - radius).floor().clamp(0.0, max_y) as usize;
        let y1 = (y + radius).ceil().clamp(0.0, max_y) as usize;
        let r2 = radius * radius;
        for py in y0..=y1 {
            let dy = py as f64 + 0.5 - y;
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - x;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let cell = &mut self.cleared[py * self.width + px];
                if !*cell {
                    *cell = true;
                    self.cleared_count += 1;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScratchCard {
    rewards: Vec<Reward>,
    tuning: ScratchTuning,
    foil: Foil,
    pointer: Option<(f64, f64)>,
    revealed: bool,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<ScratchTask>,
    completion: Completion,
}

impl ScratchCard {
    /// Put the pointer down, scratching under it. Returns the cleared fraction.
    ///
    /// # Errors
    ///
    /// Rejected once the card is revealed.
    pub fn press(&mut self, x: f64, y: f64) -> Result<f64, Rejected> {
        if self.revealed {
            return Err(Rejected::Finished);
        }
        self.pointer = Some((x, y));
        self.foil.stamp(x, y, self.tuning.brush_radius);
        self.check_threshold();
        Ok(self.foil.fraction())
    }

    /// Move the pressed pointer, scratching along the path.
    ///
    /// # Errors
    ///
    /// Rejected when the pointer is not pressed and once the card is revealed.
    pub fn drag(&mut self, x: f64, y: f64) -> Result<f64, Rejected> {
        if self.revealed {
            return Err(Rejected::Finished);
        }
        let Some((from_x, from_y)) = self.pointer else {
            return Err(Rejected::NotStarted);
        };
        let radius = self.tuning.brush_radius;
        let distance = (x - from_x).hypot(y - from_y);
        // Stamps half a brush apart leave no gaps along fast drags.
        let steps = (distance / (radius / 2.0).max(1.0)).ceil().max(1.0) as usize;
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            self.foil
                .stamp(from_x + (x - from_x) * t, from_y + (y - from_y) * t, radius);
        }
        self.pointer = Some((x, y));
        self.check_threshold();
        Ok(self.foil.fraction())
    }

    pub fn release(&mut self) {
        self.pointer = None;
    }

    #[must_use]
    pub fn cleared_fraction(&self) -> f64 {
        self.foil.fraction()
    }

    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pointer.is_some()
    }

    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.tuning.width, self.tuning.height)
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn check_threshold(&mut self) {
        if self.revealed || self.foil.fraction() < self.tuning.threshold {
            return;
        }
        self.revealed = true;
        self.pointer = None;
        log::debug!("scratch card {:.0}% cleared", self.foil.fraction() * 100.0);
        self.timers
            .after(Duration::from_millis(self.tuning.reveal_ms), ScratchTask::Reveal);
    }

    fn on_timer(&mut self, task: ScratchTask) {
        match task {
            ScratchTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for ScratchCard {
    type Tuning = ScratchTuning;

    fn activate(rewards: Vec<Reward>, tuning: &ScratchTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            foil: Foil::new(tuning.width, tuning.height),
            pointer: None,
            revealed: false,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::ScratchReveal
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
        self.revealed
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
