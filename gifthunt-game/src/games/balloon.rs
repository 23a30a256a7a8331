//! Balloon pop: one balloon hides the gift, pop until it turns up.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalloonTuning {
    #[serde(default = "BalloonTuning::default_balloons")]
    pub balloons: usize,
    #[serde(default = "BalloonTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl BalloonTuning {
    const fn default_balloons() -> usize {
        8
    }

    const fn default_reveal_ms() -> u64 {
        500
    }
}

impl Default for BalloonTuning {
    fn default() -> Self {
        Self {
            balloons: Self::default_balloons(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balloon {
    pub id: usize,
    pub popped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalloonTask {
    Reveal,
}

#[derive(Debug, Clone)]
pub struct PopReveal {
    rewards: Vec<Reward>,
    tuning: BalloonTuning,
    balloons: Vec<Balloon>,
    gift_slot: Option<usize>,
    found: bool,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<BalloonTask>,
    completion: Completion,
}

impl PopReveal {
    /// Release the balloons and hide the gift in one of them.
    ///
    /// # Errors
    ///
    /// Rejected when the balloons are already up.
    pub fn start(&mut self) -> Result<(), Rejected> {
        if self.gift_slot.is_some() {
            return Err(Rejected::AlreadyStarted);
        }
        let count = self.tuning.balloons.max(1);
        self.balloons = (0..count).map(|id| Balloon { id, popped: false }).collect();
        self.gift_slot = Some(self.rng.gen_range(0..count));
        Ok(())
    }

    /// Pop one balloon. Returns true when it held the gift.
    ///
    /// # Errors
    ///
    /// Rejected before `start`, after the gift is found, and for unknown or
    /// already popped balloons.
    pub fn pop(&mut self, id: usize) -> Result<bool, Rejected> {
        let Some(gift_slot) = self.gift_slot else {
            return Err(Rejected::NotStarted);
        };
        if self.found {
            return Err(Rejected::Finished);
        }
        let len = self.balloons.len();
        let balloon = self
            .balloons
            .get_mut(id)
            .ok_or(Rejected::OutOfBounds { index: id, len })?;
        if balloon.popped {
            return Err(Rejected::AlreadyTaken { index: id });
        }
        balloon.popped = true;
        if id == gift_slot {
            self.found = true;
            log::debug!("gift balloon {id} popped");
            self.timers
                .after(Duration::from_millis(self.tuning.reveal_ms), BalloonTask::Reveal);
        }
        Ok(self.found)
    }

    #[must_use]
    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.gift_slot.is_some()
    }

    /// The balloon that held the gift, once it has been popped.
    #[must_use]
    pub fn gift_balloon(&self) -> Option<usize> {
        self.gift_slot.filter(|_| self.found)
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn on_timer(&mut self, task: BalloonTask) {
        match task {
            BalloonTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for PopReveal {
    type Tuning = BalloonTuning;

    fn activate(rewards: Vec<Reward>, tuning: &BalloonTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            balloons: Vec::new(),
            gift_slot: None,
            found: false,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::PopReveal
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
        self.found
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
