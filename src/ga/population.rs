//! Single-population evolutionary loop: one generation's pairing,
//! crossover, mutation and selection, and the outer loop that drives it to
//! `iterations` or the wall-clock budget (spec.md §4.7).

use super::{selection, Chromosome, GaConfig, GaOutcome};
use crate::domain::Verdict;
use crate::fitness::is_winner;
use crate::rng::Prng;
use std::time::Instant;

pub fn run_single_population<C, Env>(
    cfg: &GaConfig,
    env: &mut Env,
    rng: &mut Prng,
    start: Instant,
) -> GaOutcome<C>
where
    C: Chromosome<Env>,
{
    let mut population = C::initial_population(env, cfg.population_size, rng);
    let mut accumulated_winners = Vec::new();
    let mut generations_run = 0;

    for _ in 0..cfg.iterations {
        if start.elapsed() >= cfg.budget() {
            break;
        }

        let (next_population, winners) = run_generation::<C, Env>(cfg, env, population, rng);
        population = next_population;
        generations_run += 1;
        crate::trace::trace(
            cfg.debug,
            format!("ga: generation {generations_run} produced {} winner(s)", winners.len()),
        );

        if !winners.is_empty() {
            accumulated_winners.extend(winners.iter().cloned());
            if cfg.stop_on_results {
                return GaOutcome {
                    winners: accumulated_winners,
                    generations_run,
                };
            }
            if cfg.replace_winners {
                population = replace_winners::<C, Env>(population, &winners, env, cfg.population_size, rng);
            }
        }
    }

    GaOutcome {
        winners: accumulated_winners,
        generations_run,
    }
}

/// One generation: pairing -> crossover -> mutation -> selection -> winner
/// extraction (spec.md §4.7 steps 1-5). Shared by the single-population
/// loop above and by each island's per-generation step in `island.rs`.
pub(crate) fn run_generation<C, Env>(
    cfg: &GaConfig,
    env: &mut Env,
    population: Vec<C>,
    rng: &mut Prng,
) -> (Vec<C>, Vec<C>)
where
    C: Chromosome<Env>,
{
    let pairs: Vec<(C, C)> = if let Some(t) = &cfg.tournament {
        let champions = selection::tournament_champions::<C, Env>(&population, env, population.len(), t, rng);
        selection::pair(&champions, rng)
    } else {
        selection::pair(&population, rng)
    };

    let mut children: Vec<C> = Vec::with_capacity(population.len());
    for (a, b) in pairs {
        if rng.coin(cfg.crossover_rate) {
            let (c1, c2) = a.crossover(&b, rng);
            children.push(c1);
            children.push(c2);
        } else {
            children.push(a);
            children.push(b);
        }
    }

    let mut mutated: Vec<(C, Option<Verdict>)> = Vec::with_capacity(children.len());
    for child in children {
        if rng.coin(cfg.mutation_rate) {
            let (m, verdict) = child.mutate(env, rng);
            mutated.push((m, verdict));
        } else {
            mutated.push((child, None));
        }
    }

    let next_population: Vec<C> = if cfg.tournament.is_some() {
        // Tournament pre-selection already is the elitism step: children
        // replace parents directly rather than competing in a merged pool.
        mutated
            .into_iter()
            .map(|(c, v)| {
                let _ = c.fitness(env, v.as_ref());
                c
            })
            .collect()
    } else {
        let mut combined: Vec<(C, f64)> = population
            .iter()
            .map(|c| (c.clone(), c.fitness(env, None)))
            .collect();
        for (c, v) in mutated {
            let f = c.fitness(env, v.as_ref());
            combined.push((c, f));
        }
        selection::environmental_select(combined, cfg.population_size)
            .into_iter()
            .map(|(c, _)| c)
            .collect()
    };

    let winners: Vec<C> = next_population
        .iter()
        .filter(|c| is_winner(c.fitness(env, None)))
        .cloned()
        .collect();

    (next_population, winners)
}

/// Delete winners from the surviving population and refill to
/// `population_size` via `initial_population` (spec.md §4.7 step 7,
/// "replaceWinners").
pub(crate) fn replace_winners<C, Env>(
    population: Vec<C>,
    winners: &[C],
    env: &mut Env,
    population_size: usize,
    rng: &mut Prng,
) -> Vec<C>
where
    C: Chromosome<Env>,
{
    let mut remaining: Vec<C> = population.into_iter().filter(|c| !winners.contains(c)).collect();
    let deficit = population_size.saturating_sub(remaining.len());
    if deficit > 0 {
        remaining.extend(C::initial_population(env, deficit, rng));
    }
    remaining
}
