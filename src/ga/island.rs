//! Island migration (spec.md §4.7 "Island migration").

use super::population::{replace_winners, run_generation};
use super::{Chromosome, GaConfig, GaOutcome};
use crate::rng::Prng;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct IslandConfig {
    pub count: usize,
    pub migration_interval: u64,
    pub migration_size: usize,
    pub ringwise: bool,
}

pub fn run_islands<C, Env>(
    cfg: &GaConfig,
    island_cfg: &IslandConfig,
    env: &mut Env,
    rng: &mut Prng,
    start: Instant,
) -> GaOutcome<C>
where
    C: Chromosome<Env>,
{
    let mut islands: Vec<Vec<C>> = (0..island_cfg.count)
        .map(|_| C::initial_population(env, cfg.population_size, rng))
        .collect();

    let mut accumulated_winners = Vec::new();
    let mut generations_run: u64 = 0;

    for gen in 0..cfg.iterations {
        if start.elapsed() >= cfg.budget() {
            break;
        }

        let mut any_winners = false;
        for island in islands.iter_mut() {
            let pop = std::mem::take(island);
            let (next_pop, winners) = run_generation::<C, Env>(cfg, env, pop, rng);
            *island = next_pop;
            if !winners.is_empty() {
                any_winners = true;
                accumulated_winners.extend(winners.iter().cloned());
                if cfg.replace_winners {
                    let taken = std::mem::take(island);
                    *island = replace_winners::<C, Env>(taken, &winners, env, cfg.population_size, rng);
                }
            }
        }
        generations_run += 1;

        if any_winners && cfg.stop_on_results {
            return GaOutcome {
                winners: accumulated_winners,
                generations_run,
            };
        }

        let generation_number = gen + 1;
        if island_cfg.migration_interval > 0 && generation_number % island_cfg.migration_interval == 0 {
            migrate::<C, Env>(&mut islands, island_cfg, env, rng);
        }
    }

    GaOutcome {
        winners: accumulated_winners,
        generations_run,
    }
}

/// Sort each island ascending by fitness, peel off the best
/// `migration_size` as migrants and the worst `migration_size` as vacated
/// slots, then recombine `remaining ++ incoming_migrants` (spec.md §4.7
/// "Island migration"). Ring-wise rotation passes each island's migrant
/// batch to its successor (`tail ++ head`); otherwise batches are shuffled
/// across islands. `migration_size` is clamped to half an island's size so
/// migrants and vacated slots never overlap.
fn migrate<C, Env>(islands: &mut [Vec<C>], cfg: &IslandConfig, env: &mut Env, rng: &mut Prng)
where
    C: Chromosome<Env>,
{
    let n = islands.len();
    if n == 0 {
        return;
    }

    let mut migrant_batches: Vec<Vec<C>> = Vec::with_capacity(n);
    let mut remaining_islands: Vec<Vec<C>> = Vec::with_capacity(n);

    for island in islands.iter() {
        let mut scored: Vec<(C, f64)> = island
            .iter()
            .cloned()
            .map(|c| {
                let f = c.fitness(env, None);
                (c, f)
            })
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("fitness values are always finite"));

        let size = scored.len();
        let k = cfg.migration_size.min(size / 2);
        let migrants: Vec<C> = scored[..k].iter().map(|(c, _)| c.clone()).collect();
        let remaining: Vec<C> = scored[k..size - k].iter().map(|(c, _)| c.clone()).collect();

        migrant_batches.push(migrants);
        remaining_islands.push(remaining);
    }

    let rotated: Vec<Vec<C>> = if cfg.ringwise {
        let mut batches = migrant_batches;
        if !batches.is_empty() {
            let first = batches.remove(0);
            batches.push(first);
        }
        batches
    } else {
        rng.shuffle(&migrant_batches)
    };

    for (island, (mut remaining, incoming)) in islands
        .iter_mut()
        .zip(remaining_islands.into_iter().zip(rotated.into_iter()))
    {
        remaining.extend(incoming);
        *island = remaining;
    }
}
