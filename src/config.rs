//! Ambient configuration: CLI flag defaults plus an optional `fixsynth.toml`
//! override file, deserialized directly into a struct with a `Default`
//! impl so a missing file or missing table just falls back cleanly.
//! Precedence is: built-in defaults < `fixsynth.toml` < explicit CLI flags,
//! the last of those applied by `src/bin/fxs.rs` after loading this.

use crate::error::{FixsynthError, FixsynthResult};
use crate::ga::{GaConfig, IslandConfig, TournamentConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// `-fholes`/`-fdepth`/`-fdebug` (spec.md §6) plus the GA defaults a
/// `fixsynth.toml` may override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixsynthConfig {
    pub holes: u32,
    pub depth: i64,
    pub debug: bool,
    pub search: SearchDefaults,
}

impl Default for FixsynthConfig {
    fn default() -> Self {
        Self {
            holes: 2,
            depth: 1,
            debug: false,
            search: SearchDefaults::default(),
        }
    }
}

/// `fixsynth.toml`'s `[search]` table: `GaConfig` in a serde-friendly,
/// flattened shape (tournament/island are each an all-or-nothing group of
/// fields rather than a nested table, to keep the file format simple).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub drop_rate: f64,
    pub iterations: u64,
    pub population_size: usize,
    pub timeout_in_minutes: u64,
    pub stop_on_results: bool,
    pub replace_winners: bool,
    pub try_minimize_fixes: bool,
    pub tournament_size: Option<usize>,
    pub tournament_rounds: Option<usize>,
    pub island_count: Option<usize>,
    pub island_migration_interval: Option<u64>,
    pub island_migration_size: Option<usize>,
    pub island_ringwise: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        let ga = GaConfig::default();
        Self {
            mutation_rate: ga.mutation_rate,
            crossover_rate: ga.crossover_rate,
            drop_rate: ga.drop_rate,
            iterations: ga.iterations,
            population_size: ga.population_size,
            timeout_in_minutes: ga.timeout_in_minutes,
            stop_on_results: ga.stop_on_results,
            replace_winners: ga.replace_winners,
            try_minimize_fixes: ga.try_minimize_fixes,
            tournament_size: None,
            tournament_rounds: None,
            island_count: None,
            island_migration_interval: None,
            island_migration_size: None,
            island_ringwise: false,
        }
    }
}

impl SearchDefaults {
    pub fn to_ga_config(&self) -> GaConfig {
        GaConfig {
            mutation_rate: self.mutation_rate,
            crossover_rate: self.crossover_rate,
            drop_rate: self.drop_rate,
            iterations: self.iterations,
            population_size: self.population_size,
            timeout_in_minutes: self.timeout_in_minutes,
            stop_on_results: self.stop_on_results,
            replace_winners: self.replace_winners,
            try_minimize_fixes: self.try_minimize_fixes,
            tournament: match (self.tournament_size, self.tournament_rounds) {
                (Some(size), Some(rounds)) => Some(TournamentConfig { size, rounds }),
                _ => None,
            },
            island: match (self.island_count, self.island_migration_interval, self.island_migration_size) {
                (Some(count), Some(migration_interval), Some(migration_size)) => Some(IslandConfig {
                    count,
                    migration_interval,
                    migration_size,
                    ringwise: self.island_ringwise,
                }),
                _ => None,
            },
        }
    }
}

impl FixsynthConfig {
    /// Load `fixsynth.toml`, or an explicit path. A missing file at the
    /// default location is not an error - it just means "use defaults".
    pub fn load(path: Option<&Path>) -> FixsynthResult<Self> {
        let default_path = Path::new("fixsynth.toml");
        let path = path.unwrap_or(default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| FixsynthError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| FixsynthError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Configuration invalid (e.g. a negative `-fdepth`) is a fatal error
    /// the CLI must surface before search ever starts (spec.md §7).
    pub fn validate(&self) -> FixsynthResult<()> {
        if self.depth < 0 {
            return Err(FixsynthError::Config("-fdepth must be >= 0".to_string()));
        }
        self.to_ga_config().validate()
    }

    pub fn to_ga_config(&self) -> GaConfig {
        let mut ga = self.search.to_ga_config();
        ga.debug = self.debug;
        ga
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ga_config_defaults() {
        let cfg = FixsynthConfig::default();
        assert_eq!(cfg.holes, 2);
        assert_eq!(cfg.depth, 1);
        assert!(!cfg.debug);
        let ga = cfg.to_ga_config();
        assert_eq!(ga.population_size, GaConfig::default().population_size);
        assert!(ga.tournament.is_none());
        assert!(ga.island.is_none());
    }

    #[test]
    fn negative_depth_fails_validation() {
        let mut cfg = FixsynthConfig::default();
        cfg.depth = -1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loading_a_nonexistent_file_falls_back_to_defaults() {
        let cfg = FixsynthConfig::load(Some(Path::new("/nonexistent/fixsynth.toml"))).unwrap();
        assert_eq!(cfg.holes, 2);
    }

    #[test]
    fn parses_search_table_overrides() {
        let toml = r#"
            holes = 3

            [search]
            population_size = 10
            iterations = 5
            tournament_size = 4
            tournament_rounds = 2
        "#;
        let cfg: FixsynthConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.holes, 3);
        let ga = cfg.to_ga_config();
        assert_eq!(ga.population_size, 10);
        assert_eq!(ga.iterations, 5);
        assert!(ga.tournament.is_some());
    }
}
