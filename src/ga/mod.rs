//! Genetic Search Core (C7, spec.md §4.7).
//!
//! The evolutionary loop in spec.md is phrased as recursion over
//! "generations remaining"; here that recursion is a plain loop carrying
//! `(population(s), generations_run, accumulated_winners)`, with wall-clock
//! budget checked once per generation rather than per recursive call.

pub mod efix_chromosome;
pub mod island;
pub mod population;
pub mod selection;

pub use efix_chromosome::{EFixChromosome, EFixEnv};
pub use island::IslandConfig;
pub use selection::TournamentConfig;

use crate::domain::Verdict;
use crate::error::FixsynthError;
use crate::rng::Prng;
use std::time::{Duration, Instant};

/// The "polymorphic chromosome" abstraction spec.md §9 calls for: anything
/// implementing these four operations can be searched by the loop below
/// without it knowing about `EFix`. `Env` carries whatever external state a
/// gene's operators need (an oracle handle, a fitness cache, the problem
/// being solved) but the driver itself does not own.
///
/// `Env` is a type parameter of the trait rather than an associated type so
/// that implementations whose environment borrows data (as `EFix`'s does)
/// can name a lifetime at the `impl` site instead of the trait.
pub trait Chromosome<Env>: Clone + Eq + std::hash::Hash + Sized {
    /// Split two parents into two children (spec.md §4.7 "Crossover").
    fn crossover(&self, other: &Self, rng: &mut Prng) -> (Self, Self);

    /// Mutate one individual. When the mutation incidentally learned its
    /// verdict (e.g. a property check it just ran), return it alongside so
    /// the caller can seed the fitness cache without recomputing.
    fn mutate(&self, env: &mut Env, rng: &mut Prng) -> (Self, Option<Verdict>);

    /// Fitness in `[0, 1]`, lower is better. `precomputed`, when given, is
    /// used on a cache miss instead of re-running the check.
    fn fitness(&self, env: &mut Env, precomputed: Option<&Verdict>) -> f64;

    /// Sample `size` individuals for a fresh population (spec.md §4.7
    /// "Initial population").
    fn initial_population(env: &mut Env, size: usize, rng: &mut Prng) -> Vec<Self>;
}

/// Tunables for `run` (spec.md §4.7). Defaults mirror spec.md's own stated
/// defaults where it gives one; the rest are this crate's choices, recorded
/// in DESIGN.md.
#[derive(Debug, Clone)]
pub struct GaConfig {
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub drop_rate: f64,
    pub iterations: u64,
    pub population_size: usize,
    pub timeout_in_minutes: u64,
    pub stop_on_results: bool,
    pub replace_winners: bool,
    pub try_minimize_fixes: bool,
    pub tournament: Option<TournamentConfig>,
    pub island: Option<IslandConfig>,
    /// `-fdebug` (spec.md §6): emit a trace line per generation via
    /// `crate::trace::trace`.
    pub debug: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.2,
            crossover_rate: 0.05,
            drop_rate: 0.2,
            iterations: 20,
            population_size: 32,
            timeout_in_minutes: 5,
            stop_on_results: true,
            replace_winners: true,
            try_minimize_fixes: false,
            tournament: None,
            island: None,
            debug: false,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), FixsynthError> {
        for (name, rate) in [
            ("mutationRate", self.mutation_rate),
            ("crossoverRate", self.crossover_rate),
            ("dropRate", self.drop_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(FixsynthError::Config(format!(
                    "{name} must be in [0, 1], got {rate}"
                )));
            }
        }
        if self.population_size < 2 || self.population_size % 2 != 0 {
            return Err(FixsynthError::Config(
                "populationSize must be >= 2 and even".to_string(),
            ));
        }
        if self.iterations < 1 {
            return Err(FixsynthError::Config("iterations must be >= 1".to_string()));
        }
        if let Some(t) = &self.tournament {
            if t.size == 0 || t.rounds == 0 {
                return Err(FixsynthError::Config(
                    "tournament size and rounds must be >= 1".to_string(),
                ));
            }
        }
        if let Some(i) = &self.island {
            if i.count < 2 {
                return Err(FixsynthError::Config("island count must be >= 2".to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn budget(&self) -> Duration {
        Duration::from_secs(self.timeout_in_minutes * 60)
    }
}

/// Outcome of `run`. `winners` is in discovery order: earlier generations'
/// finds appear before later ones (spec.md §5).
#[derive(Debug, Clone)]
pub struct GaOutcome<C> {
    pub winners: Vec<C>,
    pub generations_run: u64,
}

/// `geneticSearch(config, problem) -> [winningFixes]` (spec.md §4.7).
/// Dispatches to a single population or, when `cfg.island` is set, to
/// `island::run_islands`.
///
/// Callers are expected to have validated `cfg` already (e.g. at the CLI
/// boundary, spec.md §7 "Configuration invalid" is a fatal, pre-search
/// error); this only debug-asserts it.
pub fn run<C, Env>(cfg: &GaConfig, env: &mut Env, rng: &mut Prng) -> GaOutcome<C>
where
    C: Chromosome<Env>,
{
    debug_assert!(
        cfg.validate().is_ok(),
        "GaConfig must be validated by the caller before run"
    );
    let start = Instant::now();
    if let Some(island_cfg) = cfg.island.clone() {
        island::run_islands::<C, Env>(cfg, &island_cfg, env, rng, start)
    } else {
        population::run_single_population::<C, Env>(cfg, env, rng, start)
    }
}
