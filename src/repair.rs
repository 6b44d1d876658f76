//! Repair Driver (C4, spec.md §4.4).

use crate::check_builder::build_check_source;
use crate::domain::{ContextBinding, Expression, Problem, PropertyName, SourceSpan, TypeSig, Verdict};
use crate::fix::EFix;
use crate::oracle::{Oracle, OracleConfig};
use crate::sandbox::{run_check, SandboxConfig};

/// `repair(properties, context, type, wrongProgram) -> [fixedPrograms]`
/// (spec.md §4.4). Wraps `wrong_program` as a hole in context, retrieves
/// hole fits, and keeps the candidate replacements whose checks all pass.
pub fn repair(
    oracle: &mut dyn Oracle,
    oracle_cfg: &OracleConfig,
    properties: &[PropertyName],
    context: &[ContextBinding],
    ty: &TypeSig,
    wrong_program: &Expression,
) -> Vec<Expression> {
    let sites = repair_attempt_sites(oracle, oracle_cfg, ty, wrong_program);

    let mut fixed = Vec::new();
    for (site, fit_expr) in sites {
        let candidate = EFix::single(site, fit_expr).apply(oracle, wrong_program);
        let source = build_check_source(properties, context, ty, candidate.text());
        let Ok(mut compiled) = oracle.compile_checks(oracle_cfg, &[source]) else {
            continue;
        };
        let Some(check) = compiled.pop() else {
            continue;
        };
        if run_check(&check, &SandboxConfig::default()) == Verdict::AllPass {
            fixed.push(candidate);
        }
    }
    fixed
}

/// Single-step variant used by the GA (spec.md §4.7 "Mutation"): returns
/// *all* candidate fixes with their raw verdicts, unfiltered, so fitness
/// can be computed lazily by the caller.
///
/// Each returned fix carries exactly one entry, keyed at the hole's own
/// site rather than the problem's whole repair site, so that independent
/// holes produce independent, non-overlapping fixes a GA can merge
/// (spec.md §8 scenario F requires winning fixes with ≥ 2 entries, which
/// is only reachable if single-step fixes are this fine-grained).
pub fn repair_attempt(
    oracle: &mut dyn Oracle,
    oracle_cfg: &OracleConfig,
    problem: &Problem,
) -> Vec<(EFix, Verdict)> {
    let sites = repair_attempt_sites(oracle, oracle_cfg, &problem.ty, &problem.program);

    sites
        .into_iter()
        .map(|(site, fit_expr)| {
            let fix = EFix::single(site, fit_expr);
            let candidate = fix.apply(oracle, &problem.program);
            let source = build_check_source(
                &problem.properties,
                &problem.context,
                &problem.ty,
                candidate.text(),
            );
            let verdict = match oracle.compile_checks(oracle_cfg, &[source]) {
                Ok(mut compiled) => match compiled.pop() {
                    Some(check) => run_check(&check, &SandboxConfig::default()),
                    None => Verdict::AllFail,
                },
                Err(_) => Verdict::AllFail,
            };
            (fix, verdict)
        })
        .collect()
}

/// Length of the `"("` prefix `repair_attempt_sites` wraps the wrong
/// program in to anchor typing (spec.md §4.4 step 1). Hole sites the
/// oracle reports are relative to the annotated text; subtracting this
/// maps them back to `wrong_program`'s own coordinates, which is the
/// coordinate system `Problem::repair_site` and `EFix` spans live in.
const ANNOTATION_PREFIX_LEN: u32 = 1;

/// Steps 1-3 of spec.md §4.4: anchor the wrong expression with a type
/// annotation, ask the oracle for every holey rewrite, and retrieve hole
/// fits for each, returning each fit paired with the site (in
/// `wrong_program`'s own coordinates) it would fill.
fn repair_attempt_sites(
    oracle: &mut dyn Oracle,
    oracle_cfg: &OracleConfig,
    ty: &TypeSig,
    wrong_program: &Expression,
) -> Vec<(SourceSpan, Expression)> {
    let annotated = format!("({} :: {})", wrong_program.text(), ty.0);
    let holey_forms = oracle.get_holey(oracle_cfg, &annotated);
    crate::trace::trace(
        oracle_cfg.debug,
        format!("repair: {} holey rewrite(s) of `{}`", holey_forms.len(), wrong_program.text()),
    );

    let mut sites = Vec::new();
    for holey in &holey_forms {
        let fits = oracle.get_hole_fits(oracle_cfg, holey);
        crate::trace::trace(
            oracle_cfg.debug,
            format!("repair: {} fit(s) at site {}", fits.len(), holey.site),
        );
        let site = SourceSpan::new(
            holey.site.start - ANNOTATION_PREFIX_LEN,
            holey.site.end - ANNOTATION_PREFIX_LEN,
        );
        for fit in fits {
            sites.push((site, fit.expr));
        }
    }
    sites
}
