//! Post-processing / Minimizer (C8, spec.md §4.8).
//!
//! A winning fix may carry entries no longer needed for the win (crossover
//! and mutation accumulate independently of necessity). For a fix of size
//! `k`, enumerate all `2^k` subsets, re-check each, and keep the ones that
//! still win, smallest first.

use crate::domain::{Expression, Problem, SourceSpan, Verdict};
use crate::fitness::{fitness_of_verdict, is_winner, recheck};
use crate::fix::EFix;
use crate::oracle::{Oracle, OracleConfig};

/// Fix sizes at or below this are cheap enough for the `2^k` enumeration
/// below to be practical; callers should gate on `fix.len()` before
/// calling `minimize_fix` (spec.md §4.8: "Intended only for small fixes").
pub const MAX_MINIMIZE_SIZE: usize = 20;

/// `minimize(fix) -> [smallerWinningFixes]` (spec.md §4.8), sorted
/// ascending by entry count. The input fix itself is always a member of
/// its own subset enumeration (the all-ones mask), so a fix with no
/// redundant entries comes back as a single-element list containing
/// itself.
pub fn minimize_fix(oracle: &mut dyn Oracle, oracle_cfg: &OracleConfig, problem: &Problem, fix: &EFix) -> Vec<EFix> {
    let entries: Vec<(SourceSpan, Expression)> = fix.iter().map(|(s, e)| (*s, e.clone())).collect();
    let k = entries.len();

    let mut winners: Vec<(EFix, usize)> = Vec::new();
    for mask in 0u64..(1u64 << k) {
        let subset_entries: Vec<(SourceSpan, Expression)> = (0..k)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| entries[i].clone())
            .collect();
        let subset = EFix::from_entries(subset_entries);

        let verdict: Verdict = recheck(oracle, oracle_cfg, problem, &subset);
        if is_winner(fitness_of_verdict(&verdict)) {
            let size = subset.len();
            winners.push((subset, size));
        }
    }

    winners.sort_by_key(|(_, size)| *size);
    winners.into_iter().map(|(fix, _)| fix).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ArithmeticOracle;

    #[test]
    fn minimizing_a_single_necessary_entry_returns_just_itself() {
        let mut oracle = ArithmeticOracle::new();
        let cfg = OracleConfig::new(2);
        let problem = ArithmeticOracle::foldl_minus_problem();
        let fix = EFix::single(SourceSpan::new(6, 9), Expression::new("add"));

        let minimized = minimize_fix(&mut oracle, &cfg, &problem, &fix);
        assert_eq!(minimized.len(), 1);
        assert_eq!(minimized[0], fix);
    }

    #[test]
    fn minimizing_a_fix_with_a_redundant_entry_prefers_the_smaller_winner() {
        let mut oracle = ArithmeticOracle::new();
        let cfg = OracleConfig::new(2);
        let problem = ArithmeticOracle::foldl_minus_problem();

        // Necessary entry plus a second entry elsewhere in the program
        // text that the toy oracle's `replace_expr` applies but which the
        // single `prop_isSum` property never inspects - spurious, so the
        // 1-entry subset should still win.
        let necessary = (SourceSpan::new(6, 9), Expression::new("add"));
        let spurious = (SourceSpan::new(10, 14), Expression::new("zero"));
        let fix = EFix::from_entries(vec![necessary.clone(), spurious]);
        assert_eq!(fix.len(), 2);

        let minimized = minimize_fix(&mut oracle, &cfg, &problem, &fix);
        assert!(!minimized.is_empty());
        assert_eq!(minimized[0].len(), 1);
    }
}
