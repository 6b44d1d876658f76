// fxs - property-guided program repair and synthesis CLI
//
// Usage:
//   fxs synth --type T [--property prop_*]... [--ctx NAME=EXPR]...
//   fxs repair --problem FILE
//   fxs evolve --problem FILE [--population N] [--iterations N] [--minimize]

use clap::{Parser, Subcommand};
use fixsynth::cli::{evolve, repair, synth};
use fixsynth::config::FixsynthConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fxs")]
#[command(about = "Property-guided program repair and synthesis over an external compiler oracle", long_about = None)]
#[command(version)]
struct Cli {
    /// Top-level hole nesting (default 2)
    #[arg(long = "fholes", global = true)]
    holes: Option<u32>,

    /// Recursion depth for candidate generation (default 1, >= 0)
    #[arg(long = "fdepth", global = true)]
    depth: Option<i64>,

    /// Verbose oracle trace
    #[arg(long = "fdebug", global = true)]
    debug: bool,

    /// Path to fixsynth.toml (defaults to ./fixsynth.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pure synthesis: well-typed fits for a type in context (C3)
    Synth {
        #[arg(long = "type")]
        ty: String,

        /// Property source name, may be repeated
        #[arg(long = "property")]
        properties: Vec<String>,

        /// Context binding as NAME=EXPR, may be repeated
        #[arg(long = "ctx", value_parser = parse_context_binding)]
        context: Vec<(String, String)>,
    },
    /// One-shot repair of a wrong expression (C4)
    Repair {
        /// Path to a problem TOML file
        #[arg(long)]
        problem: PathBuf,
    },
    /// Evolutionary search over fix-sets (C7)
    Evolve {
        /// Path to a problem TOML file
        #[arg(long)]
        problem: PathBuf,

        #[arg(long)]
        population: Option<usize>,

        #[arg(long)]
        iterations: Option<u64>,

        /// Run the C8 minimizer on each winning fix
        #[arg(long)]
        minimize: bool,
    },
}

fn parse_context_binding(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, def)| (name.to_string(), def.to_string()))
        .ok_or_else(|| format!("expected NAME=EXPR, got `{s}`"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = FixsynthConfig::load(cli.config.as_deref())?;
    if let Some(holes) = cli.holes {
        config.holes = holes;
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }
    if cli.debug {
        config.debug = true;
    }
    config.validate()?;

    match cli.command {
        Commands::Synth { ty, properties, context } => synth::execute(synth::SynthArgs {
            ty,
            depth: config.depth,
            holes: config.holes,
            properties,
            context,
            debug: config.debug,
        }),
        Commands::Repair { problem } => repair::execute(repair::RepairArgs {
            problem_path: problem,
            holes: config.holes,
            debug: config.debug,
        }),
        Commands::Evolve {
            problem,
            population,
            iterations,
            minimize,
        } => {
            let mut ga_config = config.to_ga_config();
            if let Some(p) = population {
                ga_config.population_size = p;
            }
            if let Some(it) = iterations {
                ga_config.iterations = it;
            }
            if minimize {
                ga_config.try_minimize_fixes = true;
            }
            evolve::execute(evolve::EvolveArgs {
                problem_path: problem,
                holes: config.holes,
                debug: config.debug,
                ga_config,
            })
        }
    }
}
