//! Tic-tac-toe against a rule-based opponent. Only a player win grants a reward.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

pub const CENTER: usize = 4;
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Playing,
    Won,
    Lost,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeTuning {
    #[serde(default = "TicTacToeTuning::default_ai_delay_ms")]
    pub ai_delay_ms: u64,
    #[serde(default = "TicTacToeTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl TicTacToeTuning {
    const fn default_ai_delay_ms() -> u64 {
        500
    }

    const fn default_reveal_ms() -> u64 {
        1_500
    }
}

impl Default for TicTacToeTuning {
    fn default() -> Self {
        Self {
            ai_delay_ms: Self::default_ai_delay_ms(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[must_use]
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(mark) if board[b] == Some(mark) && board[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

#[must_use]
pub fn is_full(board: &Board) -> bool {
    board.iter().all(Option::is_some)
}

/// A cell that completes a line for `mark` this turn.
#[must_use]
pub fn winning_cell(board: &Board, mark: Mark) -> Option<usize> {
    (0..9).find(|&cell| {
        if board[cell].is_some() {
            return false;
        }
        let mut probe = *board;
        probe[cell] = Some(mark);
        winner(&probe) == Some(mark)
    })
}

/// Opponent move for `mark`: win, else block, else centre, else a random
/// free corner, else any random free cell.
pub fn ai_move(board: &Board, mark: Mark, rng: &mut GameRng) -> Option<usize> {
    if let Some(cell) = winning_cell(board, mark) {
        return Some(cell);
    }
    if let Some(cell) = winning_cell(board, mark.opponent()) {
        return Some(cell);
    }
    if board[CENTER].is_none() {
        return Some(CENTER);
    }
    let corners: SmallVec<[usize; 4]> = CORNERS
        .iter()
        .copied()
        .filter(|&cell| board[cell].is_none())
        .collect();
    if let Some(&cell) = corners.choose(rng) {
        return Some(cell);
    }
    let free: SmallVec<[usize; 9]> = (0..9).filter(|&cell| board[cell].is_none()).collect();
    free.choose(rng).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicTacToeTask {
    AiMove,
    Reveal,
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    rewards: Vec<Reward>,
    tuning: TicTacToeTuning,
    board: Board,
    turn: Mark,
    status: RoundStatus,
    rounds: u32,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<TicTacToeTask>,
    completion: Completion,
}

impl TicTacToe {
    /// The player's mark.
    pub const PLAYER: Mark = Mark::X;

    /// Place the player's mark.
    ///
    /// # Errors
    ///
    /// Rejected while the opponent is thinking, for taken or unknown cells,
    /// after a lost or drawn round until `reset`, and once the player has won.
    pub fn play(&mut self, cell: usize) -> Result<RoundStatus, Rejected> {
        match self.status {
            RoundStatus::Playing => {}
            RoundStatus::Won => return Err(Rejected::Finished),
            RoundStatus::Lost | RoundStatus::Draw => return Err(Rejected::RoundOver),
        }
        if self.turn != Self::PLAYER {
            return Err(Rejected::NotYourTurn);
        }
        let slot = self
            .board
            .get(cell)
            .ok_or(Rejected::OutOfBounds { index: cell, len: 9 })?;
        if slot.is_some() {
            return Err(Rejected::AlreadyTaken { index: cell });
        }

        self.board[cell] = Some(Self::PLAYER);
        if self.settle_round() {
            return Ok(self.status);
        }
        self.turn = Self::PLAYER.opponent();
        self.timers.after(
            Duration::from_millis(self.tuning.ai_delay_ms),
            TicTacToeTask::AiMove,
        );
        Ok(self.status)
    }

    /// Start a new round after a loss or a draw.
    ///
    /// # Errors
    ///
    /// Rejected while a round is in play and once the player has won.
    pub fn reset(&mut self) -> Result<(), Rejected> {
        match self.status {
            RoundStatus::Lost | RoundStatus::Draw => {}
            RoundStatus::Playing => return Err(Rejected::Busy),
            RoundStatus::Won => return Err(Rejected::Finished),
        }
        self.board = [None; 9];
        self.turn = Self::PLAYER;
        self.status = RoundStatus::Playing;
        self.rounds += 1;
        Ok(())
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn status(&self) -> RoundStatus {
        self.status
    }

    /// Whether the player may move now.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.status == RoundStatus::Playing && self.turn == Self::PLAYER
    }

    /// Rounds started, including the current one.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    /// Apply end-of-round rules after a move. Returns true when the round ended.
    fn settle_round(&mut self) -> bool {
        match winner(&self.board) {
            Some(mark) if mark == Self::PLAYER => {
                self.status = RoundStatus::Won;
                log::debug!("tic-tac-toe won in round {}", self.rounds);
                self.timers.after(
                    Duration::from_millis(self.tuning.reveal_ms),
                    TicTacToeTask::Reveal,
                );
            }
            Some(_) => self.status = RoundStatus::Lost,
            None if is_full(&self.board) => self.status = RoundStatus::Draw,
            None => return false,
        }
        true
    }

    fn on_timer(&mut self, task: TicTacToeTask) {
        match task {
            TicTacToeTask::AiMove => {
                let ai = Self::PLAYER.opponent();
                if let Some(cell) = ai_move(&self.board, ai, &mut self.rng) {
                    log::debug!("tic-tac-toe opponent takes {cell}");
                    self.board[cell] = Some(ai);
                }
                self.turn = Self::PLAYER;
                self.settle_round();
            }
            TicTacToeTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for TicTacToe {
    type Tuning = TicTacToeTuning;

    fn activate(rewards: Vec<Reward>, tuning: &TicTacToeTuning, rng: GameRng) -> Self {
        Self {
            rewards,
            tuning: tuning.clone(),
            board: [None; 9],
            turn: Self::PLAYER,
            status: RoundStatus::Playing,
            rounds: 1,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::TicTacToe
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
        self.status == RoundStatus::Won
    }

    fn deactivate(&mut self) -> usize {
        self.timers.clear()
    }
}
