//! Sliding picture puzzle. The last tile is the blank; a tile may only
//! slide into the blank when it sits directly beside it.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::config::MAX_PUZZLE_SIZE;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleTuning {
    /// Board edge length.
    #[serde(default = "PuzzleTuning::default_size")]
    pub size: usize,
    /// Length of the random walk used to scramble the solved board.
    #[serde(default = "PuzzleTuning::default_shuffle_moves")]
    pub shuffle_moves: usize,
    #[serde(default = "PuzzleTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl PuzzleTuning {
    const fn default_size() -> usize {
        3
    }

    const fn default_shuffle_moves() -> usize {
        40
    }

    const fn default_reveal_ms() -> u64 {
        500
    }
}

impl Default for PuzzleTuning {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            shuffle_moves: Self::default_shuffle_moves(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

/// Positions orthogonally next to `position` on a `size`×`size` board.
fn neighbours(position: usize, size: usize) -> SmallVec<[usize; 4]> {
    let (row, col) = (position / size, position % size);
    let mut out = SmallVec::new();
    if row > 0 {
        out.push(position - size);
    }
    if row + 1 < size {
        out.push(position + size);
    }
    if col > 0 {
        out.push(position - 1);
    }
    if col + 1 < size {
        out.push(position + 1);
    }
    out
}

/// True when the two positions differ by exactly one row or one column, not both.
#[must_use]
pub fn is_adjacent(a: usize, b: usize, size: usize) -> bool {
    let (ar, ac) = (a / size, a % size);
    let (br, bc) = (b / size, b % size);
    (ar.abs_diff(br) == 1 && ac == bc) || (ac.abs_diff(bc) == 1 && ar == br)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PuzzleTask {
    Reveal,
}

#[derive(Debug, Clone)]
pub struct SlidePuzzle {
    rewards: Vec<Reward>,
    tuning: PuzzleTuning,
    size: usize,
    /// `cells[position]` is the tile at that position.
    cells: Vec<u8>,
    started: bool,
    solved: bool,
    moves: u32,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<PuzzleTask>,
    completion: Completion,
}

impl SlidePuzzle {
    /// Scramble the board.
    ///
    /// # Errors
    ///
    /// Rejected when the puzzle is already running.
    pub fn start(&mut self) -> Result<(), Rejected> {
        if self.started {
            return Err(Rejected::AlreadyStarted);
        }
        self.scramble();
        self.started = true;
        Ok(())
    }

    fn scramble(&mut self) {
        let mut previous = None;
        let mut walked = 0;
        while walked < self.tuning.shuffle_moves || self.is_solved() {
            let blank = self.blank_position();
            let options: SmallVec<[usize; 4]> = neighbours(blank, self.size)
                .into_iter()
                .filter(|pos| Some(*pos) != previous)
                .collect();
            let Some(&target) = options.choose(&mut self.rng) else {
                break;
            };
            self.cells.swap(blank, target);
            previous = Some(blank);
            walked += 1;
        }
    }

    /// Slide `tile` into the blank.
    ///
    /// # Errors
    ///
    /// Rejected before `start`, once solved, for unknown tiles, and when the
    /// tile is not orthogonally next to the blank. A rejected slide leaves the
    /// board unchanged.
    pub fn slide(&mut self, tile: u8) -> Result<(), Rejected> {
        if !self.started {
            return Err(Rejected::NotStarted);
        }
        if self.solved {
            return Err(Rejected::Finished);
        }
        let blank_tile = self.blank_tile();
        if tile >= blank_tile {
            return Err(Rejected::OutOfBounds {
                index: usize::from(tile),
                len: usize::from(blank_tile),
            });
        }
        let from = self.position_of(tile);
        let blank = self.blank_position();
        if !is_adjacent(from, blank, self.size) {
            return Err(Rejected::NotAdjacent { tile });
        }
        self.cells.swap(from, blank);
        self.moves += 1;
        log::debug!("slid tile {tile} from {from} to {blank}");
        if self.is_solved() {
            self.solved = true;
            self.timers
                .after(Duration::from_millis(self.tuning.reveal_ms), PuzzleTask::Reveal);
        }
        Ok(())
    }

    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// The tile value used for the empty slot.
    #[must_use]
    pub fn blank_tile(&self) -> u8 {
        u8::try_from(self.cells.len() - 1).unwrap_or(u8::MAX)
    }

    #[must_use]
    pub fn blank_position(&self) -> usize {
        self.position_of(self.blank_tile())
    }

    #[must_use]
    pub fn position_of(&self, tile: u8) -> usize {
        self.cells
            .iter()
            .position(|cell| *cell == tile)
            .unwrap_or(self.cells.len() - 1)
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.cells
            .iter()
            .enumerate()
            .all(|(pos, tile)| usize::from(*tile) == pos)
    }

    /// Shortest sequence of tiles to slide from the current board, if one
    /// can be found.
    #[must_use]
    pub fn solution(&self) -> Option<Vec<u8>> {
        solve(&self.cells, self.size)
    }

    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn on_timer(&mut self, task: PuzzleTask) {
        match task {
            PuzzleTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

fn encode(cells: &[u8]) -> u64 {
    cells
        .iter()
        .fold(0_u64, |acc, tile| (acc << 4) | u64::from(*tile))
}

/// Breadth-first search for the shortest tile sequence that solves `cells`.
///
/// Returns `None` for unsolvable boards and for boards larger than
/// [`MAX_PUZZLE_SIZE`].
#[must_use]
pub fn solve(cells: &[u8], size: usize) -> Option<Vec<u8>> {
    if size == 0 || cells.len() != size * size || size > MAX_PUZZLE_SIZE {
        return None;
    }
    let blank_tile = u8::try_from(cells.len() - 1).ok()?;
    let goal: Vec<u8> = (0..=blank_tile).collect();
    let start_key = encode(cells);
    let goal_key = encode(&goal);

    // key -> (parent key, tile slid to get here)
    let mut came_from: HashMap<u64, (u64, u8)> = HashMap::new();
    let mut queue = VecDeque::from([cells.to_vec()]);
    came_from.insert(start_key, (start_key, blank_tile));

    while let Some(board) = queue.pop_front() {
        let key = encode(&board);
        if key == goal_key {
            let mut path = Vec::new();
            let mut cursor = key;
            while cursor != start_key {
                let (parent, tile) = came_from[&cursor];
                path.push(tile);
                cursor = parent;
            }
            path.reverse();
            return Some(path);
        }
        let blank = board.iter().position(|t| *t == blank_tile)?;
        for next in neighbours(blank, size) {
            let mut child = board.clone();
            child.swap(blank, next);
            let child_key = encode(&child);
            if let std::collections::hash_map::Entry::Vacant(slot) = came_from.entry(child_key) {
                slot.insert((key, board[next]));
                queue.push_back(child);
            }
        }
    }
    None
}

impl MiniGame for SlidePuzzle {
    type Tuning = PuzzleTuning;

    fn activate(rewards: Vec<Reward>, tuning: &PuzzleTuning, rng: GameRng) -> Self {
        let size = tuning.size.clamp(2, MAX_PUZZLE_SIZE);
        let cells = (0..size * size)
            .map(|tile| u8::try_from(tile).unwrap_or(u8::MAX))
            .collect();
        Self {
            rewards,
            tuning: tuning.clone(),
            size,
            cells,
            started: false,
            solved: false,
            moves: 0,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::SlidePuzzle
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RewardCatalog;
    use crate::rng::CountingRng;

    fn started(seed: u64) -> SlidePuzzle {
        let mut game = SlidePuzzle::activate(
            RewardCatalog::gift_box().rewards().to_vec(),
            &PuzzleTuning::default(),
            CountingRng::new(seed),
        );
        game.start().unwrap();
        game
    }

    #[test]
    fn adjacency_is_orthogonal_only() {
        assert!(is_adjacent(4, 1, 3));
        assert!(is_adjacent(4, 3, 3));
        assert!(is_adjacent(4, 5, 3));
        assert!(is_adjacent(4, 7, 3));
        assert!(!is_adjacent(4, 0, 3));
        assert!(!is_adjacent(4, 8, 3));
        assert!(!is_adjacent(2, 3, 3), "row wrap is not adjacency");
        assert!(!is_adjacent(4, 4, 3));
    }

    #[test]
    fn scramble_is_never_solved() {
        for seed in 0..32 {
            let game = started(seed);
            assert!(!game.is_solved(), "seed {seed}");
            let mut sorted = game.cells().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..9).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn only_tiles_beside_the_blank_move() {
        let game = started(3);
        let blank = game.blank_position();
        for tile in 0..8_u8 {
            let mut probe = game.clone();
            let from = probe.position_of(tile);
            let result = probe.slide(tile);
            if is_adjacent(from, blank, 3) {
                assert_eq!(result, Ok(()));
                assert_eq!(probe.position_of(tile), blank);
                assert_eq!(probe.blank_position(), from);
            } else {
                assert_eq!(result, Err(Rejected::NotAdjacent { tile }));
                assert_eq!(probe.cells(), game.cells());
                assert_eq!(probe.moves(), 0);
            }
        }
    }

    #[test]
    fn slides_are_rejected_outside_play() {
        let mut game = SlidePuzzle::activate(
            RewardCatalog::gift_box().rewards().to_vec(),
            &PuzzleTuning::default(),
            CountingRng::new(1),
        );
        assert_eq!(game.slide(0), Err(Rejected::NotStarted));
        game.start().unwrap();
        assert_eq!(game.start(), Err(Rejected::AlreadyStarted));
        assert_eq!(game.slide(8), Err(Rejected::OutOfBounds { index: 8, len: 8 }));
    }

    #[test]
    fn following_the_solution_wins_and_reveals_once() {
        let mut game = started(17);
        let path = game.solution().expect("scrambled boards are solvable");
        assert!(!path.is_empty());
        for tile in path {
            game.slide(tile).unwrap();
        }
        assert!(game.is_won());
        assert_eq!(game.slide(0), Err(Rejected::Finished));
        game.tick(Duration::from_millis(500));
        let index = game.take_completion().unwrap();
        assert_eq!(game.granted(), game.rewards().get(index));
        assert_eq!(game.take_completion(), None);
    }

    #[test]
    fn solver_rejects_unsolvable_parity() {
        // Two tiles swapped: odd permutation with the blank home.
        let cells = [1, 0, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(solve(&cells, 3), None);
        assert_eq!(solve(&[0, 1, 2, 3], 2), Some(Vec::new()));
        assert_eq!(solve(&[0, 1, 3, 2], 2), Some(vec![2]));
    }
}
