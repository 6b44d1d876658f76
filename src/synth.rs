//! Candidate Generator / Synthesizer (C3, spec.md §4.3).

use crate::check_builder::build_check_source;
use crate::domain::{ContextBinding, Expression, PropertyName, TypeSig};
use crate::oracle::{Oracle, OracleConfig};
use crate::sandbox::{run_check, SandboxConfig};
use std::collections::HashMap;

/// `(compilerConfig, depth, context, type, properties) -> [canonical candidate strings]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    oracle_cfg: OracleConfig,
    depth: i64,
    context: Vec<(String, String)>,
    ty: TypeSig,
    properties: Vec<PropertyName>,
}

#[derive(Default)]
pub struct MemoCache {
    entries: HashMap<MemoKey, Vec<Expression>>,
    /// Number of cache misses that reached the oracle; exposed so tests
    /// can assert memoization soundness (spec.md §8 property 1: "the
    /// second [call] does not invoke the oracle").
    pub oracle_invocations: u64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(
        cfg: &OracleConfig,
        depth: i64,
        context: &[ContextBinding],
        ty: &TypeSig,
        properties: &[PropertyName],
    ) -> MemoKey {
        MemoKey {
            oracle_cfg: *cfg,
            depth,
            context: context
                .iter()
                .map(|b| (b.name.clone(), b.definition.text().to_string()))
                .collect(),
            ty: ty.clone(),
            properties: properties.to_vec(),
        }
    }
}

/// `synthesize(depth, context, properties, type) -> [expressions]`
/// (spec.md §4.3). Returns the list of well-typed expressions of `type` in
/// `context` that satisfy `properties`; with no properties, returns all
/// well-typed fits without executing anything.
pub fn synthesize(
    oracle: &mut dyn Oracle,
    memo: &mut MemoCache,
    oracle_cfg: &OracleConfig,
    depth: i64,
    context: &[ContextBinding],
    properties: &[PropertyName],
    ty: &TypeSig,
) -> Vec<Expression> {
    if depth < 0 {
        return Vec::new();
    }

    let key = MemoCache::key(oracle_cfg, depth, context, ty, properties);
    if let Some(cached) = memo.entries.get(&key) {
        crate::trace::trace(
            oracle_cfg.debug,
            format!("synth: memo hit at depth {depth} for `{}` ({} candidate(s))", ty.0, cached.len()),
        );
        return cached.clone();
    }

    crate::trace::trace(oracle_cfg.debug, format!("synth: memo miss at depth {depth} for `{}`", ty.0));
    let candidates = synthesize_uncached(oracle, memo, oracle_cfg, depth, context, properties, ty);
    memo.entries.insert(key, candidates.clone());
    candidates
}

fn synthesize_uncached(
    oracle: &mut dyn Oracle,
    memo: &mut MemoCache,
    oracle_cfg: &OracleConfig,
    depth: i64,
    context: &[ContextBinding],
    properties: &[PropertyName],
    ty: &TypeSig,
) -> Vec<Expression> {
    if !properties.is_empty() {
        memo.oracle_invocations += 1;
        if oracle.monomorphise_type(oracle_cfg, ty).is_none() {
            return Vec::new();
        }
    }

    // Entering the last depth level drops the oracle's hole-nesting level
    // to 0; synthesizing with no properties always queries at 0.
    let query_cfg = if properties.is_empty() || depth == 0 {
        oracle_cfg.at_level(0)
    } else {
        *oracle_cfg
    };

    let context_text = render_context(context);
    memo.oracle_invocations += 1;
    let fit_set = match oracle.compile_at_type(&query_cfg, &context_text, ty) {
        Ok(fs) => fs,
        Err(_) => return Vec::new(),
    };

    let mut candidates: Vec<Expression> = fit_set
        .direct_fits
        .into_iter()
        .map(|fit| fit.expr)
        .collect();

    crate::trace::trace(
        oracle_cfg.debug,
        format!(
            "synth: oracle returned {} direct fit(s) and {} reusable hole(s) for `{}`",
            candidates.len(),
            fit_set.reusable_holes.len(),
            ty.0
        ),
    );

    for hole in fit_set.reusable_holes {
        if let Some(expanded) =
            expand_hole(oracle, memo, oracle_cfg, depth, context, &hole.skeleton, &hole.sub_hole_types)
        {
            candidates.extend(expanded);
        }
    }

    if properties.is_empty() {
        return candidates;
    }

    let total = candidates.len();
    let mut survivors = Vec::new();
    for candidate in candidates {
        if passes_properties(oracle, oracle_cfg, properties, context, ty, &candidate) {
            survivors.push(candidate);
        }
    }
    crate::trace::trace(
        oracle_cfg.debug,
        format!("synth: {}/{total} candidate(s) passed all properties for `{}`", survivors.len(), ty.0),
    );
    survivors
}

/// Recursively expand a reusable hole's sub-holes (depth - 1, no
/// properties), form the Cartesian product of their fits, and splice each
/// tuple into the skeleton. A sub-hole with no fits discards the whole
/// skeleton (spec.md §8 property 6: "Cartesian completeness").
fn expand_hole(
    oracle: &mut dyn Oracle,
    memo: &mut MemoCache,
    oracle_cfg: &OracleConfig,
    depth: i64,
    context: &[ContextBinding],
    skeleton: &Expression,
    sub_hole_types: &[TypeSig],
) -> Option<Vec<Expression>> {
    let mut per_hole_fits: Vec<Vec<Expression>> = Vec::with_capacity(sub_hole_types.len());
    for sub_ty in sub_hole_types {
        let fits = synthesize(oracle, memo, oracle_cfg, depth - 1, context, &[], sub_ty);
        if fits.is_empty() {
            return None;
        }
        per_hole_fits.push(fits);
    }

    if per_hole_fits.is_empty() {
        return Some(vec![skeleton.clone()]);
    }

    Some(
        cartesian_product(&per_hole_fits)
            .into_iter()
            .map(|combo| splice_into_skeleton(skeleton, &combo))
            .collect(),
    )
}

fn cartesian_product(lists: &[Vec<Expression>]) -> Vec<Vec<Expression>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        let mut out = Vec::with_capacity(acc.len() * list.len());
        for prefix in &acc {
            for item in list {
                let mut combo = prefix.clone();
                combo.push(item.clone());
                out.push(combo);
            }
        }
        out
    })
}

/// Concatenate a tuple of fits into the skeleton, parenthesized, in the
/// absence of a real oracle-level hole-filling pass (the abstract
/// `getHoleFits`/`fillHole` path is used for the single-hole case in
/// `repair.rs`; here the skeleton already carries placeholder markers
/// `{}` for each sub-hole in order, which is how a reusable hole is
/// rendered by `Oracle::compile_at_type`).
fn splice_into_skeleton(skeleton: &Expression, fills: &[Expression]) -> Expression {
    let mut text = skeleton.text().to_string();
    for fill in fills {
        let replacement = format!("({})", fill.text());
        if let Some(pos) = text.find("{}") {
            text.replace_range(pos..pos + 2, &replacement);
        }
    }
    Expression::new(text)
}

fn render_context(context: &[ContextBinding]) -> String {
    context
        .iter()
        .map(|b| format!("{} = {}; ", b.name, b.definition.text()))
        .collect()
}

fn passes_properties(
    oracle: &mut dyn Oracle,
    oracle_cfg: &OracleConfig,
    properties: &[PropertyName],
    context: &[ContextBinding],
    ty: &TypeSig,
    candidate: &Expression,
) -> bool {
    let source = build_check_source(properties, context, ty, candidate.text());
    let Ok(mut compiled) = oracle.compile_checks(oracle_cfg, &[source]) else {
        return false;
    };
    let Some(check) = compiled.pop() else {
        return false;
    };
    run_check(&check, &SandboxConfig::default()) == crate::domain::Verdict::AllPass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ArithmeticOracle;

    #[test]
    fn negative_depth_returns_empty_without_invoking_oracle() {
        let mut oracle = ArithmeticOracle::new();
        let mut memo = MemoCache::new();
        let cfg = OracleConfig::new(2);
        let result = synthesize(&mut oracle, &mut memo, &cfg, -1, &[], &[], &TypeSig::new("Int"));
        assert!(result.is_empty());
        assert_eq!(memo.oracle_invocations, 0);
    }

    #[test]
    fn repeated_calls_hit_the_memo_cache() {
        let mut oracle = ArithmeticOracle::new();
        let mut memo = MemoCache::new();
        let cfg = OracleConfig::new(2);
        let ctx = ArithmeticOracle::standard_context();

        let first = synthesize(&mut oracle, &mut memo, &cfg, 1, &ctx, &[], &TypeSig::new("Int"));
        let invocations_after_first = memo.oracle_invocations;
        assert!(!first.is_empty());

        let second = synthesize(&mut oracle, &mut memo, &cfg, 1, &ctx, &[], &TypeSig::new("Int"));
        assert_eq!(first, second);
        assert_eq!(memo.oracle_invocations, invocations_after_first);
    }
}
