//! Seeded random streams handed to mini-game modules.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

use crate::games::GameKind;

/// Random source owned by a single module activation.
pub type GameRng = CountingRng<SmallRng>;

/// Derives one independent stream per lineup stage from a user-visible seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngBundle {
    seed: u64,
    run: u32,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub const fn from_user_seed(seed: u64) -> Self {
        Self { seed, run: 0 }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// How many times the hunt has been replayed on this seed.
    #[must_use]
    pub const fn run(&self) -> u32 {
        self.run
    }

    /// Same seed, fresh streams for a replayed hunt.
    #[must_use]
    pub const fn next_run(self) -> Self {
        Self {
            seed: self.seed,
            run: self.run.wrapping_add(1),
        }
    }

    /// Stream for the module running at `stage` of the lineup.
    #[must_use]
    pub fn stream(&self, kind: GameKind, stage: usize) -> GameRng {
        let mut tag = Vec::with_capacity(32);
        tag.extend_from_slice(kind.key().as_bytes());
        tag.push(b'#');
        tag.extend_from_slice(&(stage as u64).to_le_bytes());
        if self.run > 0 {
            tag.push(b'#');
            tag.extend_from_slice(&self.run.to_le_bytes());
        }
        CountingRng::new(derive_stream_seed(self.seed, &tag))
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    /// Stream seeded directly, bypassing the bundle derivation.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Uniform reward index into a pool of `len` rewards.
///
/// # Panics
///
/// Panics when `len` is zero; modules are never activated with an empty pool.
pub fn uniform_reward(rng: &mut impl Rng, len: usize) -> usize {
    assert!(len > 0, "reward pool handed to a module must not be empty");
    rng.gen_range(0..len)
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn streams_are_stable_per_seed_and_stage() {
        let bundle = RngBundle::from_user_seed(1337);
        let mut a = bundle.stream(GameKind::WheelSpin, 0);
        let mut b = RngBundle::from_user_seed(1337).stream(GameKind::WheelSpin, 0);
        assert_eq!(a.next_u64(), b.next_u64());

        let mut other_stage = bundle.stream(GameKind::WheelSpin, 1);
        let mut other_kind = bundle.stream(GameKind::MemoryMatch, 0);
        let first = bundle.stream(GameKind::WheelSpin, 0).next_u64();
        assert_ne!(first, other_stage.next_u64());
        assert_ne!(first, other_kind.next_u64());
    }

    #[test]
    fn replayed_runs_get_fresh_streams() {
        let bundle = RngBundle::from_user_seed(7);
        let replay = bundle.next_run();
        assert_eq!(replay.seed(), 7);
        assert_eq!(replay.run(), 1);
        let first = bundle.stream(GameKind::Quiz, 0).next_u64();
        assert_ne!(first, replay.stream(GameKind::Quiz, 0).next_u64());
        assert_eq!(
            replay.stream(GameKind::Quiz, 0).next_u64(),
            RngBundle::from_user_seed(7).next_run().stream(GameKind::Quiz, 0).next_u64()
        );
    }

    #[test]
    fn counting_rng_tracks_draws() {
        let mut rng = CountingRng::new(9);
        assert_eq!(rng.draws(), 0);
        let _ = rng.next_u32();
        let _ = rng.next_u64();
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn uniform_reward_covers_every_index() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut seen = [false; 6];
        for _ in 0..500 {
            seen[uniform_reward(&mut rng, 6)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn uniform_reward_rejects_empty_pool() {
        let mut rng = CountingRng::new(1);
        let _ = uniform_reward(&mut rng, 0);
    }
}
