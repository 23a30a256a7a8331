//! Gift Hunt Game Engine
//!
//! Platform-agnostic core of the birthday gift hunt: a lineup of mini-games,
//! each granting one reward from a shrinking pool.
//! This crate provides all game logic without UI or platform-specific dependencies.

pub mod catalog;
pub mod config;
pub mod games;
pub mod orchestrator;
pub mod rng;
pub mod scheduler;

// Re-export commonly used types
pub use catalog::{Reward, RewardCatalog, RewardPool};
pub use config::{ConfigError, GameTuning, HuntConfig, Lineup};
pub use games::{
    ActiveGame, Completion, GameKind, MemoryMatch, MiniGame, PopReveal, Quiz, Rejected,
    ScratchCard, SlidePuzzle, TicTacToe, TimedTap, WheelSpin, WordUnscramble,
};
pub use orchestrator::{GameStep, HuntSnapshot, Orchestrator, StepError};
pub use rng::{CountingRng, GameRng, RngBundle, uniform_reward};
pub use scheduler::{Scheduler, TaskId};
