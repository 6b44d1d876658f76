//! Tournament and environmental selection, and pairing for crossover
//! (spec.md §4.7 "per-generation pipeline" steps 1 and 4, "Tournament
//! selection (detail)").

use super::Chromosome;
use crate::rng::Prng;

/// `size`: individuals drawn with replacement per round. `rounds`: number
/// of rounds, the running best of which is kept (spec.md §4.7).
#[derive(Debug, Clone)]
pub struct TournamentConfig {
    pub size: usize,
    pub rounds: usize,
}

/// Draw `size` individuals uniformly with replacement, keep the fittest;
/// repeat `rounds` times, keeping the best seen across all rounds.
pub fn tournament_pick<C, Env>(
    population: &[C],
    env: &mut Env,
    cfg: &TournamentConfig,
    rng: &mut Prng,
) -> C
where
    C: Chromosome<Env>,
{
    let mut overall_best: Option<(C, f64)> = None;
    for _ in 0..cfg.rounds {
        let mut round_best: Option<(C, f64)> = None;
        for _ in 0..cfg.size {
            let idx = rng.uniform_range(0, population.len() - 1);
            let candidate = population[idx].clone();
            let f = candidate.fitness(env, None);
            let better = round_best.as_ref().map(|(_, bf)| f < *bf).unwrap_or(true);
            if better {
                round_best = Some((candidate, f));
            }
        }
        if let Some((candidate, f)) = round_best {
            let better = overall_best.as_ref().map(|(_, bf)| f < *bf).unwrap_or(true);
            if better {
                overall_best = Some((candidate, f));
            }
        }
    }
    overall_best
        .map(|(c, _)| c)
        .unwrap_or_else(|| population[0].clone())
}

/// Run `n` independent tournaments to form a champion list the same size
/// as the population being replaced.
pub fn tournament_champions<C, Env>(
    population: &[C],
    env: &mut Env,
    n: usize,
    cfg: &TournamentConfig,
    rng: &mut Prng,
) -> Vec<C>
where
    C: Chromosome<Env>,
{
    (0..n)
        .map(|_| tournament_pick::<C, Env>(population, env, cfg, rng))
        .collect()
}

/// Pair the population for crossover via `partitionInPairs` (C9), which
/// drops a trailing odd individual rather than duplicating one.
pub fn pair<C: Clone>(items: &[C], rng: &mut Prng) -> Vec<(C, C)> {
    rng.partition_in_pairs(items)
}

/// Environmental selection: merge parents and children, sort ascending by
/// fitness (lower is better), keep the top `population_size` (spec.md
/// §4.7 step 4).
pub fn environmental_select<C>(mut combined: Vec<(C, f64)>, population_size: usize) -> Vec<(C, f64)> {
    combined.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .expect("fitness values are always finite, in [0, 1]")
    });
    combined.truncate(population_size);
    combined
}
