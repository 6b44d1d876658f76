// fxs repair - one-shot repair of a wrong expression (C4): every
// replacement that makes the whole program pass every property.

use anyhow::{Context as _, Result};
use colored::*;
use fixsynth::oracle::OracleConfig;
use fixsynth::problem_file::load_problem;
use fixsynth::repair::repair;
use fixsynth::testing::ArithmeticOracle;
use std::path::PathBuf;

pub struct RepairArgs {
    pub problem_path: PathBuf,
    pub holes: u32,
    pub debug: bool,
}

pub fn execute(args: RepairArgs) -> Result<()> {
    let problem = load_problem(&args.problem_path)
        .with_context(|| format!("loading problem file {}", args.problem_path.display()))?;

    println!("{} {}", "Repairing".green().bold(), problem.program.text());

    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig {
        hole_level: args.holes,
        debug: args.debug,
    };

    let fixed = repair(
        &mut oracle,
        &oracle_cfg,
        &problem.properties,
        &problem.context,
        &problem.ty,
        &problem.program,
    );

    if fixed.is_empty() {
        println!("{}", "No fix found.".yellow());
    } else {
        for candidate in &fixed {
            println!("  {}", candidate.text());
        }
        println!("{} {} fix(es)", "Found".green().bold(), fixed.len());
    }

    Ok(())
}
