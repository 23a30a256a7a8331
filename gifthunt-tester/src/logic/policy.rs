use std::collections::HashMap;

use gifthunt_game::games::tap::TapPhase;
use gifthunt_game::games::tictactoe::{Mark, RoundStatus, winning_cell};
use gifthunt_game::{ActiveGame, GameKind, MiniGame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Cell preference once there is nothing to win or block.
const TICTACTOE_PREFERENCE: [usize; 9] = [0, 8, 2, 6, 4, 1, 3, 5, 7];

/// What a policy did with one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Turn {
    /// Inputs the game accepted.
    pub accepted: u32,
    /// Inputs the game rejected.
    pub rejected: u32,
}

impl Turn {
    fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        if outcome.is_ok() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

/// Policy interface for automated play of one mini-game.
pub trait PlayPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Feed the mounted game whatever input this frame calls for.
    fn play(&mut self, game: &mut ActiveGame) -> Turn;
}

/// Build the policy that plays `kind`.
#[must_use]
pub fn policy_for(kind: GameKind, seed: u64) -> Box<dyn PlayPolicy + Send> {
    match kind {
        GameKind::WheelSpin => Box::new(SpinOnce),
        GameKind::MemoryMatch => Box::new(PerfectRecall::default()),
        GameKind::PopReveal => Box::new(PopInOrder),
        GameKind::SlidePuzzle => Box::new(SolvePuzzle::default()),
        GameKind::WordUnscramble => Box::new(GuessThenAnswer::default()),
        GameKind::Quiz => Box::new(SeededQuiz::new(seed)),
        GameKind::ScratchReveal => Box::new(RasterScratch),
        GameKind::TimedTap => Box::new(TapEverything),
        GameKind::TicTacToe => Box::new(ForkingTicTacToe),
    }
}

struct SpinOnce;

impl PlayPolicy for SpinOnce {
    fn name(&self) -> &'static str {
        "spin-once"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        if let ActiveGame::Wheel(wheel) = game
            && !wheel.is_won()
            && wheel.final_angle().is_none()
        {
            turn.record(&wheel.spin());
        }
        turn
    }
}

/// Remembers every symbol it has seen face up and never peeks at hidden cards.
#[derive(Default)]
struct PerfectRecall {
    seen: HashMap<usize, String>,
}

impl PerfectRecall {
    fn known_partner(&self, id: usize, symbol: &str, matched: &[bool]) -> Option<usize> {
        self.seen
            .iter()
            .filter(|(other, seen)| **other != id && !matched[**other] && seen.as_str() == symbol)
            .map(|(other, _)| *other)
            .min()
    }

    fn known_pair(&self, matched: &[bool]) -> Option<usize> {
        let mut ids: Vec<&usize> = self.seen.keys().collect();
        ids.sort_unstable();
        ids.into_iter().copied().find(|id| {
            !matched[*id] && self.known_partner(*id, &self.seen[id], matched).is_some()
        })
    }
}

impl PlayPolicy for PerfectRecall {
    fn name(&self) -> &'static str {
        "perfect-recall"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Memory(memory) = game else {
            return turn;
        };
        if memory.is_won() {
            return turn;
        }
        for card in memory.cards().iter().filter(|card| card.is_face_up()) {
            self.seen.insert(card.id, card.symbol.clone());
        }
        let matched: Vec<bool> = memory.cards().iter().map(|card| card.matched).collect();
        let open: Vec<usize> = memory
            .cards()
            .iter()
            .filter(|card| card.flipped && !card.matched)
            .map(|card| card.id)
            .collect();
        let unseen = memory
            .cards()
            .iter()
            .find(|card| !card.is_face_up() && !self.seen.contains_key(&card.id))
            .map(|card| card.id);

        let pick = match open.as_slice() {
            [] => self.known_pair(&matched).or(unseen),
            [first] => self
                .known_partner(*first, &self.seen[first], &matched)
                .or(unseen),
            _ => None,
        };
        if let Some(id) = pick {
            turn.record(&memory.flip(id));
        }
        turn
    }
}

struct PopInOrder;

impl PlayPolicy for PopInOrder {
    fn name(&self) -> &'static str {
        "pop-in-order"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Balloon(balloons) = game else {
            return turn;
        };
        if !balloons.is_started() {
            turn.record(&balloons.start());
        }
        if balloons.is_won() {
            return turn;
        }
        if let Some(next) = balloons.balloons().iter().find(|b| !b.popped).map(|b| b.id) {
            turn.record(&balloons.pop(next));
        }
        turn
    }
}

/// Slides the breadth-first solution one tile per frame.
#[derive(Default)]
struct SolvePuzzle {
    plan: Vec<u8>,
}

impl PlayPolicy for SolvePuzzle {
    fn name(&self) -> &'static str {
        "bfs-solver"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Puzzle(puzzle) = game else {
            return turn;
        };
        if !puzzle.is_started() {
            turn.record(&puzzle.start());
            self.plan = puzzle.solution().unwrap_or_default();
            self.plan.reverse();
        }
        if let Some(tile) = self.plan.pop() {
            turn.record(&puzzle.slide(tile));
        }
        turn
    }
}

/// Submits the scrambled letters once per word, then the answer.
#[derive(Default)]
struct GuessThenAnswer {
    missed: Option<usize>,
}

impl PlayPolicy for GuessThenAnswer {
    fn name(&self) -> &'static str {
        "guess-then-answer"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Scramble(scramble) = game else {
            return turn;
        };
        let index = scramble.current_index();
        let Some(puzzle) = scramble.current().cloned() else {
            return turn;
        };
        if self.missed == Some(index) {
            turn.record(&scramble.submit(&puzzle.word));
        } else {
            self.missed = Some(index);
            turn.record(&scramble.submit(&puzzle.scrambled));
        }
        turn
    }
}

struct SeededQuiz {
    rng: ChaCha20Rng,
}

impl SeededQuiz {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayPolicy for SeededQuiz {
    fn name(&self) -> &'static str {
        "seeded-quiz"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Quiz(quiz) = game else {
            return turn;
        };
        if quiz.selected().is_some() {
            return turn;
        }
        let Some(options) = quiz.question().map(|q| q.options.len()) else {
            return turn;
        };
        if options > 0 {
            let pick = self.rng.gen_range(0..options);
            turn.record(&quiz.answer(pick));
        }
        turn
    }
}

/// Sweeps the card in horizontal strokes one brush apart.
struct RasterScratch;

impl PlayPolicy for RasterScratch {
    fn name(&self) -> &'static str {
        "raster-scratch"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Scratch(card) = game else {
            return turn;
        };
        let (width, height) = card.dimensions();
        let mut y = 0.0;
        while !card.is_won() && y <= f64::from(height) {
            turn.record(&card.press(0.0, y));
            turn.record(&card.drag(f64::from(width), y));
            card.release();
            y += 20.0;
        }
        turn
    }
}

struct TapEverything;

impl PlayPolicy for TapEverything {
    fn name(&self) -> &'static str {
        "tap-everything"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::Tap(tap) = game else {
            return turn;
        };
        match tap.phase() {
            TapPhase::Ready => turn.record(&tap.start()),
            TapPhase::Over { .. } => turn.record(&tap.retry()),
            TapPhase::Running => {
                let ids: Vec<u64> = tap.hearts().iter().map(|heart| heart.id).collect();
                for id in ids {
                    turn.record(&tap.tap(id));
                }
            }
            TapPhase::Won { .. } => {}
        }
        turn
    }
}

/// Win, else block, else corners first; restarts lost or drawn rounds.
struct ForkingTicTacToe;

impl PlayPolicy for ForkingTicTacToe {
    fn name(&self) -> &'static str {
        "win-block-corner"
    }

    fn play(&mut self, game: &mut ActiveGame) -> Turn {
        let mut turn = Turn::default();
        let ActiveGame::TicTacToe(round) = game else {
            return turn;
        };
        match round.status() {
            RoundStatus::Lost | RoundStatus::Draw => turn.record(&round.reset()),
            RoundStatus::Playing if round.is_player_turn() => {
                let board = *round.board();
                let cell = winning_cell(&board, Mark::X)
                    .or_else(|| winning_cell(&board, Mark::O))
                    .or_else(|| {
                        TICTACTOE_PREFERENCE
                            .into_iter()
                            .find(|cell| board[*cell].is_none())
                    });
                if let Some(cell) = cell {
                    turn.record(&round.play(cell));
                }
            }
            _ => {}
        }
        turn
    }
}
