//! Fitness evaluation and caching (C6, spec.md §4.6).

use crate::domain::{Problem, Verdict};
use crate::fix::EFix;
use crate::oracle::{Oracle, OracleConfig};
use std::collections::HashMap;

/// Lower is better: 0 is perfect, 1 is worst.
pub const WIN_THRESHOLD: f64 = 0.0;

pub fn fitness_of_verdict(verdict: &Verdict) -> f64 {
    match verdict {
        Verdict::AllPass => 0.0,
        Verdict::AllFail | Verdict::Timeout | Verdict::WrongShape => 1.0,
        Verdict::Partial(bits) => {
            if bits.is_empty() {
                1.0
            } else {
                let passing = bits.iter().filter(|b| **b).count() as f64;
                1.0 - passing / bits.len() as f64
            }
        }
    }
}

/// `FitnessCache`: `Fix -> real in [0, 1]`, never invalidated within a run.
#[derive(Debug, Default)]
pub struct FitnessCache {
    entries: HashMap<EFix, f64>,
}

impl FitnessCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, fix: &EFix) -> Option<f64> {
        self.entries.get(fix).copied()
    }

    pub fn insert(&mut self, fix: EFix, value: f64) {
        self.entries.insert(fix, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `fitness(fix)`: cache hit returns immediately. On miss, either uses
    /// `precomputed` (a verdict the caller obtained incidentally, e.g.
    /// during mutation) or recomputes by applying the fix and checking it
    /// through the oracle. Always writes through.
    pub fn fitness(
        &mut self,
        oracle: &mut dyn Oracle,
        cfg: &OracleConfig,
        problem: &Problem,
        fix: &EFix,
        precomputed: Option<&Verdict>,
    ) -> f64 {
        if let Some(cached) = self.get(fix) {
            return cached;
        }

        let value = if let Some(verdict) = precomputed {
            fitness_of_verdict(verdict)
        } else {
            let candidate = fix.apply(oracle, &problem.program);
            let verdicts = oracle.check_fixes(cfg, problem, std::slice::from_ref(&candidate));
            verdicts
                .first()
                .map(fitness_of_verdict)
                .unwrap_or(1.0)
        };

        self.insert(fix.clone(), value);
        value
    }
}

/// Re-run a fix's check and confirm its claimed fitness, used both by
/// winner-correctness tests (spec.md §8 property 4) and by the minimizer
/// (C8).
pub fn recheck(
    oracle: &mut dyn Oracle,
    cfg: &OracleConfig,
    problem: &Problem,
    fix: &EFix,
) -> Verdict {
    let candidate = fix.apply(oracle, &problem.program);
    oracle
        .check_fixes(cfg, problem, &[candidate])
        .into_iter()
        .next()
        .unwrap_or(Verdict::AllFail)
}

pub fn is_winner(fitness: f64) -> bool {
    fitness == WIN_THRESHOLD
}
