use anyhow::{Result, bail};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hasher;
use std::time::{Duration, Instant};
use twox_hash::XxHash64;

use gifthunt_game::{GameStep, HuntConfig, Lineup, Orchestrator, Reward};

use super::policy::{Turn, policy_for};

/// Simulated time that passes between two policy turns.
pub const FRAME: Duration = Duration::from_millis(100);
/// Frames a single game may take before the run counts as stalled.
pub const MAX_FRAMES_PER_GAME: u32 = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// XxHash64 of the won reward names, one per passing iteration.
    pub fingerprints: Vec<String>,
    /// Simulated frames each passing iteration needed to reach the final screen.
    pub frames: Vec<u32>,
    /// Mean wall-clock time of a passing iteration, in milliseconds.
    pub average_ms: f64,
}

impl ScenarioResult {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_frames(&self) -> f64 {
        if self.frames.is_empty() {
            return 0.0;
        }
        f64::from(self.frames.iter().sum::<u32>()) / self.frames.len() as f64
    }
}

/// Outcome of one complete hunt.
#[derive(Debug, Clone)]
pub struct HuntRun {
    pub seed: u64,
    pub won: Vec<Reward>,
    pub available: Vec<Reward>,
    pub step: GameStep,
    pub frames: u32,
    pub turn: Turn,
}

impl HuntRun {
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.won)
    }
}

#[must_use]
pub fn fingerprint(won: &[Reward]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for reward in won {
        hasher.write(reward.name.as_bytes());
        hasher.write_u8(0);
    }
    hasher.finish()
}

pub struct HuntTester {
    config: HuntConfig,
    verbose: bool,
}

impl HuntTester {
    pub const fn new(config: HuntConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn run_lineup(
        &self,
        name: &str,
        lineup: &Lineup,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let config = self.config.clone().with_lineup(lineup.clone());
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing lineup: {} ({} games, seed {seed})",
                    name.bright_white(),
                    lineup.len()
                );
            }
            results.push(self.run_single_lineup(name, &config, seed, iterations));
        }

        results
    }

    fn run_single_lineup(
        &self,
        name: &str,
        config: &HuntConfig,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut fingerprints = Vec::new();
        let mut frames = Vec::new();
        let mut elapsed = Duration::ZERO;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let outcome = play_hunt(config, iteration_seed).and_then(|run| {
                check_invariants(config, &run)?;
                if i == 0 {
                    check_replay(config, &run)?;
                }
                Ok(run)
            });

            match outcome {
                Ok(run) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    elapsed += duration;
                    frames.push(run.frames);
                    fingerprints.push(format!("{:016x}", run.fingerprint()));
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) frames:{} inputs:{}/{} won:{}",
                            i + 1,
                            iterations,
                            run.frames,
                            run.turn.accepted,
                            run.turn.accepted + run.turn.rejected,
                            won_names(&run.won)
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1));
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            format!("{err:#}").red()
                        );
                    }
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average_ms = if successes == 0 {
            0.0
        } else {
            elapsed.as_secs_f64() * 1_000.0 / successes as f64
        };

        ScenarioResult {
            scenario_name: name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            fingerprints,
            frames,
            average_ms,
        }
    }
}

/// Play every game of the lineup to completion with the built-in policies.
///
/// # Errors
///
/// Fails when the configuration is invalid, the orchestrator refuses a
/// trigger, or a game does not finish within [`MAX_FRAMES_PER_GAME`].
pub fn play_hunt(config: &HuntConfig, seed: u64) -> Result<HuntRun> {
    let mut hunt = Orchestrator::new(config.clone())?.with_seed(seed);
    let mut frames = 0;
    let mut total = Turn::default();

    let mut kind = hunt.begin()?;
    loop {
        let GameStep::Playing { stage, .. } = hunt.step() else {
            bail!("expected a game step, found {}", hunt.step());
        };
        let mut policy = policy_for(kind, seed.wrapping_add(stage as u64));
        let mut completed = None;
        for _ in 0..MAX_FRAMES_PER_GAME {
            let Some(game) = hunt.active_game_mut() else {
                bail!("{kind} is not mounted at {}", hunt.step());
            };
            let turn = policy.play(game);
            total.accepted += turn.accepted;
            total.rejected += turn.rejected;
            frames += 1;
            if let Some(reward) = hunt.tick(FRAME) {
                completed = Some(reward);
                break;
            }
        }
        let Some(reward) = completed else {
            bail!(
                "{kind} ({}) did not finish within {MAX_FRAMES_PER_GAME} frames",
                policy.name()
            );
        };
        log::debug!("stage {} {kind} granted {}", stage + 1, reward.name);
        if hunt.latest_reward() != Some(&reward) {
            bail!("reveal for stage {} does not show {}", stage + 1, reward.name);
        }

        match hunt.advance()? {
            GameStep::Playing { kind: next, .. } => kind = next,
            GameStep::Final => break,
            other => bail!("advance landed on {other}"),
        }
    }

    let snapshot = hunt.snapshot();
    Ok(HuntRun {
        seed,
        won: snapshot.won,
        available: snapshot.available,
        step: snapshot.step,
        frames,
        turn: total,
    })
}

/// Pool and orchestrator properties every finished hunt must satisfy.
///
/// # Errors
///
/// Describes the first property that does not hold.
pub fn check_invariants(config: &HuntConfig, run: &HuntRun) -> Result<()> {
    if run.step != GameStep::Final {
        bail!("hunt ended on {} instead of final", run.step);
    }
    if run.won.len() != config.lineup.len() {
        bail!(
            "won {} rewards over {} games",
            run.won.len(),
            config.lineup.len()
        );
    }
    let won: HashSet<&str> = run.won.iter().map(|r| r.name.as_str()).collect();
    if won.len() != run.won.len() {
        bail!("a reward was won twice: {}", won_names(&run.won));
    }
    let available: HashSet<&str> = run.available.iter().map(|r| r.name.as_str()).collect();
    if !won.is_disjoint(&available) {
        bail!("won rewards are still available");
    }
    let catalog: HashSet<&str> = config
        .catalog
        .rewards()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    let union: HashSet<&str> = won.union(&available).copied().collect();
    if union != catalog || won.len() + available.len() != catalog.len() {
        bail!("won and available rewards do not partition the catalog");
    }
    Ok(())
}

fn check_replay(config: &HuntConfig, run: &HuntRun) -> Result<()> {
    let replay = play_hunt(config, run.seed)?;
    if replay.fingerprint() != run.fingerprint() {
        bail!(
            "seed {} is not deterministic: {} then {}",
            run.seed,
            won_names(&run.won),
            won_names(&replay.won)
        );
    }
    Ok(())
}

fn won_names(won: &[Reward]) -> String {
    won.iter()
        .map(|reward| reward.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
