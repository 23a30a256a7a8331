//! Mini-game modules and the contract every one of them satisfies.
//!
//! A module is activated with an immutable snapshot of the rewards still in
//! the pool and its own random stream. It runs its private state machine
//! from discrete inputs and timer expiries, and reports exactly one reward
//! index into that snapshot once its win condition is reached.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::Reward;
use crate::config::GameTuning;
use crate::rng::GameRng;

pub mod balloon;
pub mod memory;
pub mod puzzle;
pub mod quiz;
pub mod scramble;
pub mod scratch;
pub mod tap;
pub mod tictactoe;
pub mod wheel;

pub use balloon::PopReveal;
pub use memory::MemoryMatch;
pub use puzzle::SlidePuzzle;
pub use quiz::Quiz;
pub use scramble::WordUnscramble;
pub use scratch::ScratchCard;
pub use tap::TimedTap;
pub use tictactoe::TicTacToe;
pub use wheel::WheelSpin;

/// Identifies a mini-game variant in a lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    WheelSpin,
    MemoryMatch,
    PopReveal,
    SlidePuzzle,
    WordUnscramble,
    Quiz,
    ScratchReveal,
    TimedTap,
    TicTacToe,
}

impl GameKind {
    pub const ALL: [Self; 9] = [
        Self::WheelSpin,
        Self::MemoryMatch,
        Self::PopReveal,
        Self::SlidePuzzle,
        Self::WordUnscramble,
        Self::Quiz,
        Self::ScratchReveal,
        Self::TimedTap,
        Self::TicTacToe,
    ];

    /// Stable machine key, matching the serialized form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::WheelSpin => "wheel-spin",
            Self::MemoryMatch => "memory-match",
            Self::PopReveal => "pop-reveal",
            Self::SlidePuzzle => "slide-puzzle",
            Self::WordUnscramble => "word-unscramble",
            Self::Quiz => "quiz",
            Self::ScratchReveal => "scratch-reveal",
            Self::TimedTap => "timed-tap",
            Self::TicTacToe => "tic-tac-toe",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WheelSpin => "Spin the Wheel",
            Self::MemoryMatch => "Memory Card Match",
            Self::PopReveal => "Balloon Pop",
            Self::SlidePuzzle => "Picture Puzzle",
            Self::WordUnscramble => "Word Scramble",
            Self::Quiz => "Love Quiz",
            Self::ScratchReveal => "Scratch Card",
            Self::TimedTap => "Tap the Hearts",
            Self::TicTacToe => "Tic-Tac-Toe",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Input a module ignored. The module's state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("still resolving the previous input")]
    Busy,
    #[error("the game is already won")]
    Finished,
    #[error("the game has not been started")]
    NotStarted,
    #[error("the game is already running")]
    AlreadyStarted,
    #[error("index {index} is outside 0..{len}")]
    OutOfBounds { index: usize, len: usize },
    #[error("{index} was already used")]
    AlreadyTaken { index: usize },
    #[error("tile {tile} is not next to the empty slot")]
    NotAdjacent { tile: u8 },
    #[error("waiting for the opponent")]
    NotYourTurn,
    #[error("the round is over")]
    RoundOver,
}

/// One-shot latch carrying a module's chosen reward index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    index: Option<usize>,
    taken: bool,
}

impl Completion {
    /// Record the chosen index.
    ///
    /// # Panics
    ///
    /// Panics when `index` is not a position into a pool of `len` rewards.
    pub fn fire(&mut self, index: usize, len: usize) {
        assert!(
            index < len,
            "completion index {index} outside the {len} rewards handed to the module"
        );
        if let Some(previous) = self.index {
            log::warn!("ignoring second completion {index}; already completed with {previous}");
            return;
        }
        self.index = Some(index);
    }

    /// Hand the index out exactly once.
    pub fn take(&mut self) -> Option<usize> {
        if self.taken {
            return None;
        }
        let index = self.index?;
        self.taken = true;
        Some(index)
    }

    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    #[must_use]
    pub const fn is_fired(&self) -> bool {
        self.index.is_some()
    }
}

/// Contract shared by every mini-game module.
pub trait MiniGame {
    /// Per-game tuning knobs.
    type Tuning;

    /// Mount the module with a non-empty reward snapshot.
    fn activate(rewards: Vec<Reward>, tuning: &Self::Tuning, rng: GameRng) -> Self
    where
        Self: Sized;

    fn kind(&self) -> GameKind;

    /// Rewards this activation was handed; immutable for its lifetime.
    fn rewards(&self) -> &[Reward];

    /// Advance the module's clock, firing any scheduled effects now due.
    fn tick(&mut self, elapsed: Duration);

    /// The chosen index, yielded once per activation.
    fn take_completion(&mut self) -> Option<usize>;

    /// Whether the win condition has been reached (the reveal may still be pending).
    fn is_won(&self) -> bool;

    /// Cancel every pending scheduled effect. Returns how many were dropped.
    fn deactivate(&mut self) -> usize;
}

/// Drives a module's scheduler up to `now + elapsed`, handing each due task
/// back to the module.
macro_rules! drive_timers {
    ($game:expr, $elapsed:expr, $handler:ident) => {{
        let deadline = $game.timers.now() + $elapsed;
        while let Some(task) = $game.timers.next_due(deadline) {
            $game.$handler(task);
        }
        $game.timers.settle(deadline);
    }};
}
pub(crate) use drive_timers;

/// The module currently mounted by the orchestrator.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    Wheel(WheelSpin),
    Memory(MemoryMatch),
    Balloon(PopReveal),
    Puzzle(SlidePuzzle),
    Scramble(WordUnscramble),
    Quiz(Quiz),
    Scratch(ScratchCard),
    Tap(TimedTap),
    TicTacToe(TicTacToe),
}

macro_rules! dispatch {
    ($self:expr, $game:ident => $body:expr) => {
        match $self {
            ActiveGame::Wheel($game) => $body,
            ActiveGame::Memory($game) => $body,
            ActiveGame::Balloon($game) => $body,
            ActiveGame::Puzzle($game) => $body,
            ActiveGame::Scramble($game) => $body,
            ActiveGame::Quiz($game) => $body,
            ActiveGame::Scratch($game) => $body,
            ActiveGame::Tap($game) => $body,
            ActiveGame::TicTacToe($game) => $body,
        }
    };
}

impl ActiveGame {
    /// Mount the module for `kind`.
    #[must_use]
    pub fn activate(kind: GameKind, rewards: Vec<Reward>, tuning: &GameTuning, rng: GameRng) -> Self {
        match kind {
            GameKind::WheelSpin => Self::Wheel(WheelSpin::activate(rewards, &tuning.wheel, rng)),
            GameKind::MemoryMatch => {
                Self::Memory(MemoryMatch::activate(rewards, &tuning.memory, rng))
            }
            GameKind::PopReveal => {
                Self::Balloon(PopReveal::activate(rewards, &tuning.balloon, rng))
            }
            GameKind::SlidePuzzle => {
                Self::Puzzle(SlidePuzzle::activate(rewards, &tuning.puzzle, rng))
            }
            GameKind::WordUnscramble => {
                Self::Scramble(WordUnscramble::activate(rewards, &tuning.scramble, rng))
            }
            GameKind::Quiz => Self::Quiz(Quiz::activate(rewards, &tuning.quiz, rng)),
            GameKind::ScratchReveal => {
                Self::Scratch(ScratchCard::activate(rewards, &tuning.scratch, rng))
            }
            GameKind::TimedTap => Self::Tap(TimedTap::activate(rewards, &tuning.tap, rng)),
            GameKind::TicTacToe => {
                Self::TicTacToe(TicTacToe::activate(rewards, &tuning.tictactoe, rng))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        dispatch!(self, game => game.kind())
    }

    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        dispatch!(self, game => game.rewards())
    }

    pub fn tick(&mut self, elapsed: Duration) {
        dispatch!(self, game => game.tick(elapsed));
    }

    pub fn take_completion(&mut self) -> Option<usize> {
        dispatch!(self, game => game.take_completion())
    }

    #[must_use]
    pub fn is_won(&self) -> bool {
        dispatch!(self, game => game.is_won())
    }

    pub fn deactivate(&mut self) -> usize {
        dispatch!(self, game => game.deactivate())
    }
}
