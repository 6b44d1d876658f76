// fxs evolve - evolutionary search over fix-sets (C7), with optional
// post-hoc minimization of each winner (C8).

use anyhow::{Context as _, Result};
use colored::*;
use fixsynth::fix::EFix;
use fixsynth::ga::{self, EFixEnv, GaConfig};
use fixsynth::minimize::{minimize_fix, MAX_MINIMIZE_SIZE};
use fixsynth::oracle::OracleConfig;
use fixsynth::problem_file::load_problem;
use fixsynth::repair::repair_attempt;
use fixsynth::rng::Prng;
use fixsynth::testing::ArithmeticOracle;
use std::path::PathBuf;

pub struct EvolveArgs {
    pub problem_path: PathBuf,
    pub holes: u32,
    pub debug: bool,
    pub ga_config: GaConfig,
}

pub fn execute(args: EvolveArgs) -> Result<()> {
    args.ga_config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    let problem = load_problem(&args.problem_path)
        .with_context(|| format!("loading problem file {}", args.problem_path.display()))?;

    println!(
        "{} population={} iterations={}",
        "Evolving".green().bold(),
        args.ga_config.population_size,
        args.ga_config.iterations
    );

    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig {
        hole_level: args.holes,
        debug: args.debug,
    };

    // spec.md §7: an empty repairAttempt on a presumed-broken input is an
    // internal invariant violation for the initial population. The driver
    // itself must stay panic-free, so this is checked here instead, as a
    // configuration-adjacent fatal that aborts before search starts.
    if repair_attempt(&mut oracle, &oracle_cfg, &problem).is_empty() {
        anyhow::bail!("no single-step repair candidates for this problem; it may already satisfy every property");
    }

    let mut rng = Prng::from_seed(seed_from_problem(&problem));
    let outcome = {
        let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, args.ga_config.drop_rate);
        let outcome: ga::GaOutcome<EFix> = ga::run(&args.ga_config, &mut env, &mut rng);
        outcome
    };

    if outcome.winners.is_empty() {
        println!("{} after {} generation(s)", "No winning fix found".yellow(), outcome.generations_run);
        return Ok(());
    }

    println!(
        "{} {} winner(s) after {} generation(s)",
        "Found".green().bold(),
        outcome.winners.len(),
        outcome.generations_run
    );

    for winner in &outcome.winners {
        print_fix(winner);

        if args.ga_config.try_minimize_fixes && winner.len() <= MAX_MINIMIZE_SIZE {
            let minimized = minimize_fix(&mut oracle, &oracle_cfg, &problem, winner);
            for candidate in &minimized {
                if candidate.len() < winner.len() {
                    println!("  {} minimized to {} entries:", "->".dimmed(), candidate.len());
                    print_fix(candidate);
                }
            }
        }
    }

    Ok(())
}

fn print_fix(fix: &EFix) {
    for (span, expr) in fix.iter() {
        println!("    {span}: {}", expr.text());
    }
}

fn seed_from_problem(problem: &fixsynth::domain::Problem) -> u64 {
    problem
        .program
        .text()
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
}
