//! Word scramble: unscramble each word in turn; a hint shows after repeated misses.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPuzzle {
    pub word: String,
    pub scrambled: String,
    pub hint: String,
}

impl WordPuzzle {
    #[must_use]
    pub fn new(word: &str, scrambled: &str, hint: &str) -> Self {
        Self {
            word: word.to_string(),
            scrambled: scrambled.to_string(),
            hint: hint.to_string(),
        }
    }

    /// Case-insensitive exact match against the target word.
    #[must_use]
    pub fn accepts(&self, answer: &str) -> bool {
        answer.to_uppercase() == self.word.to_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambleTuning {
    #[serde(default = "ScrambleTuning::default_words")]
    pub words: Vec<WordPuzzle>,
    /// Wrong attempts on one word before its hint shows.
    #[serde(default = "ScrambleTuning::default_hint_after")]
    pub hint_after: u32,
    #[serde(default = "ScrambleTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl ScrambleTuning {
    fn default_words() -> Vec<WordPuzzle> {
        vec![
            WordPuzzle::new("LOVE", "VOLE", "A feeling of deep affection 💕"),
            WordPuzzle::new("HEART", "EARTH", "The organ that symbolizes love ❤️"),
            WordPuzzle::new("KISS", "SISK", "A romantic gesture with lips 💋"),
            WordPuzzle::new("SWEET", "WEETS", "Something that tastes like sugar 🍯"),
        ]
    }

    const fn default_hint_after() -> u32 {
        2
    }

    const fn default_reveal_ms() -> u64 {
        500
    }
}

impl Default for ScrambleTuning {
    fn default() -> Self {
        Self {
            words: Self::default_words(),
            hint_after: Self::default_hint_after(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

/// Result of a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    /// Correct; play moves on to the word at `next`.
    Correct { next: usize },
    /// Correct on the final word; the reward reveal is pending.
    Solved,
    Wrong { attempts: u32, hint_visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrambleTask {
    Reveal,
}

#[derive(Debug, Clone)]
pub struct WordUnscramble {
    rewards: Vec<Reward>,
    tuning: ScrambleTuning,
    current: usize,
    attempts: u32,
    hint_visible: bool,
    solved: bool,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<ScrambleTask>,
    completion: Completion,
}

impl WordUnscramble {
    /// Submit an answer for the current word.
    ///
    /// # Errors
    ///
    /// Rejected once every word is solved.
    pub fn submit(&mut self, answer: &str) -> Result<Guess, Rejected> {
        if self.solved {
            return Err(Rejected::Finished);
        }
        let Some(puzzle) = self.tuning.words.get(self.current) else {
            return Err(Rejected::Finished);
        };

        if !puzzle.accepts(answer) {
            self.attempts += 1;
            if self.attempts >= self.tuning.hint_after {
                self.hint_visible = true;
            }
            return Ok(Guess::Wrong {
                attempts: self.attempts,
                hint_visible: self.hint_visible,
            });
        }

        log::debug!("word {} solved", puzzle.word);
        self.attempts = 0;
        self.hint_visible = false;
        if self.current + 1 < self.tuning.words.len() {
            self.current += 1;
            return Ok(Guess::Correct { next: self.current });
        }
        self.solved = true;
        self.timers
            .after(Duration::from_millis(self.tuning.reveal_ms), ScrambleTask::Reveal);
        Ok(Guess::Solved)
    }

    /// Word currently on screen, until all are solved.
    #[must_use]
    pub fn current(&self) -> Option<&WordPuzzle> {
        if self.solved {
            return None;
        }
        self.tuning.words.get(self.current)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn word_count(&self) -> usize {
        self.tuning.words.len()
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Hint for the current word, once it has been unlocked.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        if !self.hint_visible {
            return None;
        }
        self.current().map(|puzzle| puzzle.hint.as_str())
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn on_timer(&mut self, task: ScrambleTask) {
        match task {
            ScrambleTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for WordUnscramble {
    type Tuning = ScrambleTuning;

    fn activate(rewards: Vec<Reward>, tuning: &ScrambleTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            current: 0,
            attempts: 0,
            hint_visible: false,
            solved: false,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::WordUnscramble
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
        self.solved
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
