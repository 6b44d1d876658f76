//! End-to-end scenarios from spec.md §8, run against the toy
//! `ArithmeticOracle` (`fixsynth::testing`) rather than a real compiler.

use fixsynth::domain::{ContextBinding, Expression, PropertyName, TypeSig, Verdict};
use fixsynth::fitness::{fitness_of_verdict, is_winner};
use fixsynth::fix::EFix;
use fixsynth::ga::{self, EFixEnv, GaConfig, IslandConfig, TournamentConfig};
use fixsynth::minimize::minimize_fix;
use fixsynth::oracle::{Oracle, OracleConfig};
use fixsynth::repair::repair;
use fixsynth::rng::Prng;
use fixsynth::synth::{synthesize, MemoCache};
use fixsynth::testing::ArithmeticOracle;

/// Scenario A: property-free synthesis over `{zero, one, add}` at `Int`.
#[test]
fn scenario_a_property_free_synthesis() {
    let mut oracle = ArithmeticOracle::new();
    let mut memo = MemoCache::new();
    let cfg = OracleConfig::new(2);
    let ctx = ArithmeticOracle::standard_context();

    let candidates = synthesize(&mut oracle, &mut memo, &cfg, 1, &ctx, &[], &TypeSig::new("Int"));
    let rendered: Vec<&str> = candidates.iter().map(|e| e.text()).collect();

    assert!(rendered.contains(&"zero"));
    assert!(rendered.contains(&"one"));
    assert!(
        rendered.iter().any(|t| t.starts_with("add ")),
        "expected at least one composition like `add zero one`, got {rendered:?}"
    );
}

/// Scenario B: synthesize `[Int] -> Int` satisfying `prop_isSum`.
#[test]
fn scenario_b_synthesize_sum_function() {
    let mut oracle = ArithmeticOracle::new();
    let mut memo = MemoCache::new();
    let cfg = OracleConfig::new(2);
    let ctx = ArithmeticOracle::standard_context();
    let properties = vec![PropertyName::new("prop_isSum")];

    let candidates = synthesize(
        &mut oracle,
        &mut memo,
        &cfg,
        1,
        &ctx,
        &properties,
        &TypeSig::new("[Int] -> Int"),
    );

    assert!(
        candidates.iter().any(|e| e.text().contains("foldl add")),
        "expected foldl add zero (or equivalent) among {candidates:?}"
    );
    assert!(
        !candidates.iter().any(|e| e.text().contains("(-)")),
        "foldl (-) zero must be rejected by prop_isSum"
    );
}

/// Scenario C: repair `foldl (-) 0` to satisfy `prop_isSum`.
#[test]
fn scenario_c_repair_foldl_minus() {
    let mut oracle = ArithmeticOracle::new();
    let cfg = OracleConfig::new(2);
    let context = ArithmeticOracle::standard_context();
    let properties = vec![PropertyName::new("prop_isSum")];
    let wrong = Expression::new("foldl (-) zero");

    let fixed = repair(
        &mut oracle,
        &cfg,
        &properties,
        &context,
        &TypeSig::new("[Int] -> Int"),
        &wrong,
    );

    assert!(!fixed.is_empty());
    assert!(fixed.iter().any(|e| e.text() == "foldl add zero"));
}

/// Scenario D: repair a diverging `gcd'` base case via the GA.
#[test]
fn scenario_d_repair_diverging_gcd() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::broken_gcd_problem();

    let mut ga_cfg = GaConfig::default();
    ga_cfg.population_size = 16;
    ga_cfg.iterations = 30;
    ga_cfg.stop_on_results = true;
    ga_cfg.replace_winners = true;

    let mut rng = Prng::from_seed(99);
    let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, ga_cfg.drop_rate);
    let outcome: ga::GaOutcome<EFix> = ga::run(&ga_cfg, &mut env, &mut rng);

    assert!(!outcome.winners.is_empty(), "expected at least one winning fix");
    assert!(outcome
        .winners
        .iter()
        .any(|fix| fix.iter().any(|(_, expr)| expr.text() == "b")),
        "expected a winner replacing the diverging case with `b`"
    );
}

/// Scenario E: a diverging candidate (in the toy language, the gcd'
/// self-recursive base case fit) yields `Timeout` and worst fitness.
#[test]
fn scenario_e_nonterminating_candidate_times_out() {
    let mut oracle = ArithmeticOracle::new();
    let cfg = OracleConfig::new(0);
    let problem = ArithmeticOracle::broken_gcd_problem();

    let diverging = Expression::new("gcd' 0 b");
    let fix = EFix::single(problem.repair_site, diverging);
    let candidate = fix.apply(&oracle, &problem.program);

    let verdicts = oracle.check_fixes(&cfg, &problem, &[candidate]);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0], Verdict::Timeout);
    assert_eq!(fitness_of_verdict(&verdicts[0]), 1.0);
}

/// Scenario F: a two-location program, GA with islands disabled,
/// `stopOnResults = true`, `replaceWinners = true`.
#[test]
fn scenario_f_multi_location_repair_via_ga() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::two_location_problem();

    let mut ga_cfg = GaConfig::default();
    ga_cfg.population_size = 32;
    ga_cfg.iterations = 20;
    ga_cfg.stop_on_results = true;
    ga_cfg.replace_winners = true;

    let mut rng = Prng::from_seed(2024);
    let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, ga_cfg.drop_rate);
    let outcome: ga::GaOutcome<EFix> = ga::run(&ga_cfg, &mut env, &mut rng);

    assert!(!outcome.winners.is_empty());
    assert!(
        outcome.winners.iter().any(|fix| fix.len() >= 2),
        "expected at least one winner touching both locations, got {:?}",
        outcome.winners.iter().map(|f| f.len()).collect::<Vec<_>>()
    );
    drop(env);
    for winner in &outcome.winners {
        let verdict = fixsynth::fitness::recheck(&mut oracle, &oracle_cfg, &problem, winner);
        assert!(is_winner(fitness_of_verdict(&verdict)));
    }
}

/// GA with tournament selection configured instead of environmental
/// selection still converges on the same two-location problem.
#[test]
fn tournament_selection_also_finds_a_winner() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::two_location_problem();

    let mut ga_cfg = GaConfig::default();
    ga_cfg.population_size = 24;
    ga_cfg.iterations = 40;
    ga_cfg.stop_on_results = true;
    ga_cfg.tournament = Some(TournamentConfig { size: 3, rounds: 2 });

    let mut rng = Prng::from_seed(777);
    let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, ga_cfg.drop_rate);
    let outcome: ga::GaOutcome<EFix> = ga::run(&ga_cfg, &mut env, &mut rng);

    assert!(!outcome.winners.is_empty());
}

/// GA with island migration enabled still converges.
#[test]
fn island_migration_also_finds_a_winner() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::two_location_problem();

    let mut ga_cfg = GaConfig::default();
    ga_cfg.population_size = 16;
    ga_cfg.iterations = 40;
    ga_cfg.stop_on_results = true;
    ga_cfg.island = Some(IslandConfig {
        count: 3,
        migration_interval: 4,
        migration_size: 2,
        ringwise: true,
    });

    let mut rng = Prng::from_seed(555);
    let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, ga_cfg.drop_rate);
    let outcome: ga::GaOutcome<EFix> = ga::run(&ga_cfg, &mut env, &mut rng);

    assert!(!outcome.winners.is_empty());
}

/// Winner-correctness (spec.md §8 property 4): every claimed-perfect fix
/// the GA returns must re-check as `AllPass` through the oracle directly.
#[test]
fn winners_recheck_as_all_pass() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::foldl_minus_problem();

    let mut ga_cfg = GaConfig::default();
    ga_cfg.population_size = 16;
    ga_cfg.iterations = 20;
    ga_cfg.stop_on_results = true;

    let mut rng = Prng::from_seed(11);
    let mut env = EFixEnv::new(&mut oracle, oracle_cfg, &problem, ga_cfg.drop_rate);
    let outcome: ga::GaOutcome<EFix> = ga::run(&ga_cfg, &mut env, &mut rng);

    assert!(!outcome.winners.is_empty());
    drop(env);

    for winner in &outcome.winners {
        let candidate = winner.apply(&oracle, &problem.program);
        let verdicts = oracle.check_fixes(&oracle_cfg, &problem, &[candidate]);
        assert_eq!(verdicts[0], Verdict::AllPass);
    }
}

/// Minimizer soundness (spec.md §8 property 5): every fix `minimize_fix`
/// returns is a subset of the input and itself a winner.
#[test]
fn minimizer_returns_winning_subsets_only() {
    let mut oracle = ArithmeticOracle::new();
    let oracle_cfg = OracleConfig::new(2);
    let problem = ArithmeticOracle::foldl_minus_problem();

    let necessary_span = fixsynth::domain::SourceSpan::new(6, 9);
    let fix = EFix::single(necessary_span, Expression::new("add"));

    let minimized = minimize_fix(&mut oracle, &oracle_cfg, &problem, &fix);
    assert!(!minimized.is_empty());
    for m in &minimized {
        assert!(m.len() <= fix.len());
        let candidate = m.apply(&oracle, &problem.program);
        let verdicts = oracle.check_fixes(&oracle_cfg, &problem, &[candidate]);
        assert_eq!(verdicts[0], Verdict::AllPass);
    }
}

/// Memoization soundness (spec.md §8 property 1): two consecutive
/// `synthesize` calls return identical results and the second does not
/// invoke the oracle.
#[test]
fn memoization_soundness_across_two_calls() {
    let mut oracle = ArithmeticOracle::new();
    let mut memo = MemoCache::new();
    let cfg = OracleConfig::new(2);
    let ctx = ArithmeticOracle::standard_context();

    let first = synthesize(&mut oracle, &mut memo, &cfg, 1, &ctx, &[], &TypeSig::new("Int"));
    let calls_before = oracle.compile_at_type_calls;
    let second = synthesize(&mut oracle, &mut memo, &cfg, 1, &ctx, &[], &TypeSig::new("Int"));

    assert_eq!(first, second);
    assert_eq!(oracle.compile_at_type_calls, calls_before);
}

/// A context whose type cannot be monomorphized yields no candidates and
/// no crash (spec.md §7 "Monomorphization failure").
#[test]
fn unmonomorphizable_type_yields_no_candidates() {
    let mut oracle = ArithmeticOracle::new();
    let mut memo = MemoCache::new();
    let cfg = OracleConfig::new(2);
    let properties = vec![PropertyName::new("prop_isSum")];

    let candidates = synthesize(
        &mut oracle,
        &mut memo,
        &cfg,
        1,
        &[] as &[ContextBinding],
        &properties,
        &TypeSig::new("Unmonomorphizable"),
    );
    assert!(candidates.is_empty());
}
