//! `EFix` as a `Chromosome` (spec.md §9 "Polymorphic chromosome
//! abstraction"): the one gene type this crate ships.

use super::Chromosome;
use crate::domain::{Expression, Problem, SourceSpan, Verdict};
use crate::fitness::FitnessCache;
use crate::fix::EFix;
use crate::oracle::{Oracle, OracleConfig};
use crate::repair::repair_attempt;
use crate::rng::Prng;

/// External state `EFix`'s operators need but don't own themselves: the
/// compiler oracle, the problem being repaired, and a `FitnessCache` that
/// lives for the whole search (spec.md §4.6: "never invalidated within a
/// run"). `drop_rate` is threaded here rather than read back out of
/// `GaConfig` so `mutate` doesn't need a second parameter.
pub struct EFixEnv<'a> {
    pub oracle: &'a mut dyn Oracle,
    pub oracle_cfg: OracleConfig,
    pub problem: &'a Problem,
    pub cache: FitnessCache,
    pub drop_rate: f64,
}

impl<'a> EFixEnv<'a> {
    pub fn new(oracle: &'a mut dyn Oracle, oracle_cfg: OracleConfig, problem: &'a Problem, drop_rate: f64) -> Self {
        Self {
            oracle,
            oracle_cfg,
            problem,
            cache: FitnessCache::new(),
            drop_rate,
        }
    }
}

/// Marker type only used to name the `Chromosome` impl below in doc links;
/// `EFix` itself is the gene, `EFixEnv` its environment.
pub type EFixChromosome = EFix;

impl<'a> Chromosome<EFixEnv<'a>> for EFix {
    fn crossover(&self, other: &Self, rng: &mut Prng) -> (Self, Self) {
        crossover_efix(self, other, rng)
    }

    fn mutate(&self, env: &mut EFixEnv<'a>, rng: &mut Prng) -> (Self, Option<Verdict>) {
        mutate_efix(self, env, rng)
    }

    fn fitness(&self, env: &mut EFixEnv<'a>, precomputed: Option<&Verdict>) -> f64 {
        env.cache
            .fitness(env.oracle, &env.oracle_cfg, env.problem, self, precomputed)
    }

    fn initial_population(env: &mut EFixEnv<'a>, size: usize, rng: &mut Prng) -> Vec<Self> {
        initial_population_efix(env, size, rng)
    }
}

/// Pick independent crossover points (uniform in `[1, len]`) in each
/// parent's entry list; child A is prefix(a) ++ suffix(b), child B is
/// prefix(b) ++ suffix(a); both are rebuilt through `EFix::from_entries`
/// so the no-overlap rule re-applies to the spliced list (spec.md §4.7
/// "Crossover"). A parent with no entries can't be split meaningfully, so
/// crossover against an empty fix returns the parents unchanged.
fn crossover_efix(a: &EFix, b: &EFix, rng: &mut Prng) -> (EFix, EFix) {
    let a_entries: Vec<(SourceSpan, Expression)> = a.iter().map(|(s, e)| (*s, e.clone())).collect();
    let b_entries: Vec<(SourceSpan, Expression)> = b.iter().map(|(s, e)| (*s, e.clone())).collect();

    if a_entries.is_empty() || b_entries.is_empty() {
        return (a.clone(), b.clone());
    }

    let a_point = rng.uniform_range(1, a_entries.len());
    let b_point = rng.uniform_range(1, b_entries.len());

    let mut child_a_entries = a_entries[..a_point].to_vec();
    child_a_entries.extend(b_entries[b_point..].iter().cloned());

    let mut child_b_entries = b_entries[..b_point].to_vec();
    child_b_entries.extend(a_entries[a_point..].iter().cloned());

    (
        EFix::from_entries(child_a_entries),
        EFix::from_entries(child_b_entries),
    )
}

/// With probability `drop_rate`, drop one randomly chosen entry from a
/// non-empty fix. Otherwise, take one single-step fix from a fresh
/// `repairAttempt` and merge it into the current fix, returning the
/// verdict that attempt produced so the caller can seed the fitness cache
/// (spec.md §4.7 "Mutation"). The returned verdict describes the *picked
/// single-step fix itself*, not the merged result, so it is only forwarded
/// to the caller as a precomputed fitness-cache entry when `current` was
/// empty beforehand - the one case where merged and single-step fix
/// coincide.
fn mutate_efix(current: &EFix, env: &mut EFixEnv, rng: &mut Prng) -> (EFix, Option<Verdict>) {
    if !current.is_empty() && rng.coin(env.drop_rate) {
        let spans: Vec<SourceSpan> = current.spans().copied().collect();
        if let Some(idx) = rng.uniform_pick_index(&spans) {
            let mut next = current.clone();
            next.remove(&spans[idx]);
            return (next, None);
        }
    }

    let attempts = repair_attempt(env.oracle, &env.oracle_cfg, env.problem);
    let Some((child_fix, verdict)) = rng.uniform_pick(&attempts) else {
        // spec.md §7: an empty repairAttempt during mutation is benign -
        // the individual may already be a winner. Leave it unchanged
        // rather than treating it as a failure.
        return (current.clone(), None);
    };

    let merged = current.merge(child_fix);
    let precomputed = if current.is_empty() {
        Some(verdict.clone())
    } else {
        None
    };
    (merged, precomputed)
}

/// Each individual is one element chosen uniformly from the result of a
/// fresh `repairAttempt` on the problem, sampled `size` times; the attempt
/// itself runs once per call, not once per individual (spec.md §4.7
/// "Initial population").
fn initial_population_efix(env: &mut EFixEnv, size: usize, rng: &mut Prng) -> Vec<EFix> {
    let attempts = repair_attempt(env.oracle, &env.oracle_cfg, env.problem);
    if attempts.is_empty() {
        return Vec::new();
    }
    (0..size)
        .filter_map(|_| rng.uniform_pick(&attempts).map(|(fix, _)| fix.clone()))
        .collect()
}
