//! Quiz: answer every question; any answer advances, the score is for show.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(question: &str, options: &[&str], correct: usize) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|opt| (*opt).to_string()).collect(),
            correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTuning {
    #[serde(default = "QuizTuning::default_questions")]
    pub questions: Vec<QuizQuestion>,
    /// How long the right/wrong highlight stays before the next question.
    #[serde(default = "QuizTuning::default_advance_ms")]
    pub advance_ms: u64,
    #[serde(default = "QuizTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl QuizTuning {
    fn default_questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new(
                "What was our first movie date?",
                &["Spiderman", "Avengers", "Wonder Woman", "Batman"],
                0,
            ),
            QuizQuestion::new(
                "What's your favorite sweet treat?",
                &["Ice cream", "Chocolate", "Cookies", "Cake"],
                1,
            ),
            QuizQuestion::new(
                "What do you love to do most?",
                &["Dancing", "Singing", "Drawing", "Reading"],
                2,
            ),
        ]
    }

    const fn default_advance_ms() -> u64 {
        1_500
    }

    const fn default_reveal_ms() -> u64 {
        1_000
    }
}

impl Default for QuizTuning {
    fn default() -> Self {
        Self {
            questions: Self::default_questions(),
            advance_ms: Self::default_advance_ms(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizTask {
    Advance,
    Reveal,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    rewards: Vec<Reward>,
    tuning: QuizTuning,
    current: usize,
    selected: Option<usize>,
    score: usize,
    complete: bool,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<QuizTask>,
    completion: Completion,
}

impl Quiz {
    /// Pick an option for the current question. Returns whether it was right.
    ///
    /// # Errors
    ///
    /// Rejected while the previous answer is still highlighted, for options
    /// outside the question, and once every question is answered.
    pub fn answer(&mut self, option: usize) -> Result<bool, Rejected> {
        if self.complete {
            return Err(Rejected::Finished);
        }
        if self.selected.is_some() {
            return Err(Rejected::Busy);
        }
        let Some(question) = self.tuning.questions.get(self.current) else {
            return Err(Rejected::Finished);
        };
        let len = question.options.len();
        if option >= len {
            return Err(Rejected::OutOfBounds { index: option, len });
        }

        let correct = option == question.correct;
        if correct {
            self.score += 1;
        }
        self.selected = Some(option);
        self.timers
            .after(Duration::from_millis(self.tuning.advance_ms), QuizTask::Advance);
        Ok(correct)
    }

    #[must_use]
    pub fn question(&self) -> Option<&QuizQuestion> {
        if self.complete {
            return None;
        }
        self.tuning.questions.get(self.current)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.tuning.questions.len()
    }

    /// Option highlighted for the current question, if answered.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn on_timer(&mut self, task: QuizTask) {
        match task {
            QuizTask::Advance => {
                self.selected = None;
                if self.current + 1 < self.tuning.questions.len() {
                    self.current += 1;
                    return;
                }
                self.complete = true;
                log::debug!(
                    "quiz complete with {}/{} correct",
                    self.score,
                    self.tuning.questions.len()
                );
                self.timers
                    .after(Duration::from_millis(self.tuning.reveal_ms), QuizTask::Reveal);
            }
            QuizTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for Quiz {
    type Tuning = QuizTuning;

    fn activate(rewards: Vec<Reward>, tuning: &QuizTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            current: 0,
            selected: None,
            score: 0,
            complete: false,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::Quiz
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
        self.complete
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
