// fxs synth - pure candidate synthesis (C3): well-typed fits for a type in
// a context, optionally filtered by properties.

use anyhow::Result;
use colored::*;
use fixsynth::domain::{ContextBinding, Expression, PropertyName, TypeSig};
use fixsynth::oracle::OracleConfig;
use fixsynth::synth::{synthesize, MemoCache};
use fixsynth::testing::ArithmeticOracle;

pub struct SynthArgs {
    pub ty: String,
    pub depth: i64,
    pub holes: u32,
    pub properties: Vec<String>,
    pub context: Vec<(String, String)>,
    pub debug: bool,
}

pub fn execute(args: SynthArgs) -> Result<()> {
    println!("{} {}", "Synthesizing".green().bold(), args.ty);

    // fixsynth ships no compiler backend of its own (spec.md §1); the CLI
    // runs against the demo arithmetic sub-language from `testing` so this
    // command works out of the box. A production embedding supplies its
    // own `Oracle` and calls straight into `fixsynth::synth::synthesize`.
    let mut oracle = ArithmeticOracle::new();
    let mut memo = MemoCache::new();
    let oracle_cfg = OracleConfig {
        hole_level: args.holes,
        debug: args.debug,
    };

    let context: Vec<ContextBinding> = args
        .context
        .into_iter()
        .map(|(name, def)| ContextBinding::new(name, Expression::new(def)))
        .collect();
    let properties: Vec<PropertyName> = args.properties.into_iter().map(PropertyName::new).collect();
    let ty = TypeSig::new(args.ty);

    let candidates = synthesize(&mut oracle, &mut memo, &oracle_cfg, args.depth, &context, &properties, &ty);

    if candidates.is_empty() {
        println!("{}", "No candidates found.".yellow());
    } else {
        for candidate in &candidates {
            println!("  {}", candidate.text());
        }
        println!("{} {} candidate(s)", "Found".green().bold(), candidates.len());
    }

    Ok(())
}
