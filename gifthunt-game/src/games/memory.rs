//! Memory match: flip two cards at a time until every pair is locked.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

use super::{Completion, GameKind, MiniGame, Rejected, drive_timers};
use crate::catalog::Reward;
use crate::rng::{GameRng, uniform_reward};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTuning {
    /// One pair of cards is dealt per symbol.
    #[serde(default = "MemoryTuning::default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "MemoryTuning::default_compare_ms")]
    pub compare_ms: u64,
    #[serde(default = "MemoryTuning::default_reveal_ms")]
    pub reveal_ms: u64,
}

impl MemoryTuning {
    fn default_symbols() -> Vec<String> {
        ["💕", "🌟", "🦋", "🌸", "✨", "🎀"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    const fn default_compare_ms() -> u64 {
        1_000
    }

    const fn default_reveal_ms() -> u64 {
        500
    }
}

impl Default for MemoryTuning {
    fn default() -> Self {
        Self {
            symbols: Self::default_symbols(),
            compare_ms: Self::default_compare_ms(),
            reveal_ms: Self::default_reveal_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub symbol: String,
    pub flipped: bool,
    pub matched: bool,
}

impl Card {
    #[must_use]
    pub const fn is_face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

/// What a successful flip did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// First card of a pair is face up.
    Opened,
    /// Second card is face up; the pair resolves after the compare delay.
    Comparing { matching: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryTask {
    Compare { first: usize, second: usize },
    Reveal,
}

#[derive(Debug, Clone)]
pub struct MemoryMatch {
    rewards: Vec<Reward>,
    tuning: MemoryTuning,
    cards: Vec<Card>,
    face_up: SmallVec<[usize; 2]>,
    matched_pairs: usize,
    won: bool,
    granted: Option<usize>,
    rng: GameRng,
    timers: Scheduler<MemoryTask>,
    completion: Completion,
}

impl MemoryMatch {
    /// Turn a face-down card.
    ///
    /// # Errors
    ///
    /// Rejected while two cards are waiting to be compared, for unknown or
    /// already face-up cards, and once every pair is matched.
    pub fn flip(&mut self, id: usize) -> Result<Flip, Rejected> {
        if self.won {
            return Err(Rejected::Finished);
        }
        let len = self.cards.len();
        let card = self
            .cards
            .get(id)
            .ok_or(Rejected::OutOfBounds { index: id, len })?;
        if self.face_up.len() == 2 {
            return Err(Rejected::Busy);
        }
        if card.is_face_up() {
            return Err(Rejected::AlreadyTaken { index: id });
        }

        self.cards[id].flipped = true;
        self.face_up.push(id);
        if let [first, second] = self.face_up[..] {
            let matching = self.cards[first].symbol == self.cards[second].symbol;
            self.timers.after(
                Duration::from_millis(self.tuning.compare_ms),
                MemoryTask::Compare { first, second },
            );
            return Ok(Flip::Comparing { matching });
        }
        Ok(Flip::Opened)
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub const fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    /// Reward drawn once the win popup shows.
    #[must_use]
    pub fn granted(&self) -> Option<&Reward> {
        self.granted.and_then(|idx| self.rewards.get(idx))
    }

    fn on_timer(&mut self, task: MemoryTask) {
        match task {
            MemoryTask::Compare { first, second } => {
                if self.cards[first].symbol == self.cards[second].symbol {
                    self.cards[first].matched = true;
                    self.cards[second].matched = true;
                    self.matched_pairs += 1;
                    log::debug!(
                        "memory pair {} matched ({}/{})",
                        self.cards[first].symbol,
                        self.matched_pairs,
                        self.total_pairs()
                    );
                } else {
                    self.cards[first].flipped = false;
                    self.cards[second].flipped = false;
                }
                self.face_up.clear();
                if self.matched_pairs == self.total_pairs() {
                    self.won = true;
                    self.timers
                        .after(Duration::from_millis(self.tuning.reveal_ms), MemoryTask::Reveal);
                }
            }
            MemoryTask::Reveal => {
                let index = uniform_reward(&mut self.rng, self.rewards.len());
                self.granted = Some(index);
                self.completion.fire(index, self.rewards.len());
            }
        }
    }
}

impl MiniGame for MemoryMatch {
    type Tuning = MemoryTuning;

    fn activate(rewards: Vec<Reward>, tuning: &MemoryTuning, mut rng: GameRng) -> Self {
        let mut symbols: Vec<String> = tuning
            .symbols
            .iter()
            .chain(tuning.symbols.iter())
            .cloned()
            .collect();
        symbols.shuffle(&mut rng);
        let cards = symbols
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Card {
                id,
                symbol,
                flipped: false,
                matched: false,
            })
            .collect();
        Self {
            rewards,
            tuning: tuning.clone(),
            cards,
            face_up: SmallVec::new(),
            matched_pairs: 0,
            won: false,
            granted: None,
            rng,
            timers: Scheduler::new(),
            completion: Completion::default(),
        }
    }

    fn kind(&self) -> GameKind {
        GameKind::MemoryMatch
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
        self.won
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

    fn game(seed: u64) -> MemoryMatch {
        MemoryMatch::activate(
            RewardCatalog::gift_box().rewards().to_vec(),
            &MemoryTuning::default(),
            CountingRng::new(seed),
        )
    }

    fn partner_of(game: &MemoryMatch, id: usize) -> usize {
        let symbol = &game.cards()[id].symbol;
        game.cards()
            .iter()
            .find(|card| card.id != id && &card.symbol == symbol)
            .map(|card| card.id)
            .unwrap()
    }

    fn mismatch_of(game: &MemoryMatch, id: usize) -> usize {
        let symbol = &game.cards()[id].symbol;
        game.cards()
            .iter()
            .find(|card| !card.matched && &card.symbol != symbol)
            .map(|card| card.id)
            .unwrap()
    }

    #[test]
    fn deals_two_of_every_symbol() {
        let game = game(11);
        assert_eq!(game.cards().len(), 12);
        assert_eq!(game.total_pairs(), 6);
        for symbol in MemoryTuning::default().symbols {
            assert_eq!(game.cards().iter().filter(|c| c.symbol == symbol).count(), 2);
        }
    }

    #[test]
    fn mismatched_pair_flips_back_after_delay() {
        let mut game = game(5);
        let other = mismatch_of(&game, 0);
        assert_eq!(game.flip(0), Ok(Flip::Opened));
        assert_eq!(game.flip(0), Err(Rejected::AlreadyTaken { index: 0 }));
        assert_eq!(game.flip(other), Ok(Flip::Comparing { matching: false }));

        let third = (0..12).find(|id| *id != 0 && *id != other).unwrap();
        assert_eq!(game.flip(third), Err(Rejected::Busy));

        game.tick(Duration::from_millis(1_000));
        assert!(!game.cards()[0].flipped);
        assert!(!game.cards()[other].flipped);
        assert_eq!(game.matched_pairs(), 0);
        assert!(game.flip(third).is_ok());
    }

    #[test]
    fn matching_every_pair_grants_a_reward_once() {
        let mut game = game(21);
        assert_eq!(game.flip(99), Err(Rejected::OutOfBounds { index: 99, len: 12 }));
        while game.matched_pairs() < game.total_pairs() {
            let first = game.cards().iter().find(|c| !c.matched).unwrap().id;
            let second = partner_of(&game, first);
            game.flip(first).unwrap();
            assert_eq!(game.flip(second), Ok(Flip::Comparing { matching: true }));
            game.tick(Duration::from_millis(1_000));
        }
        assert!(game.is_won());
        assert_eq!(game.flip(0), Err(Rejected::Finished));
        assert_eq!(game.take_completion(), None);

        game.tick(Duration::from_millis(500));
        let index = game.take_completion().unwrap();
        assert!(index < game.rewards().len());
        assert_eq!(game.granted(), game.rewards().get(index));
        game.tick(Duration::from_secs(5));
        assert_eq!(game.take_completion(), None);
    }
}
