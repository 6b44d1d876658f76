//! Check Builder (C2, spec.md §4.2): renders a candidate and its property
//! list into a single check source fragment, evaluated by the oracle as
//! "produces a boolean vector".
//!
//! The wire format is purposely simple and stable (§9 design note
//! "Dynamic shape checking"): the generated fragment binds `candidate` at
//! `type` in `context`, applies every property to it in order, and prints
//! the resulting booleans as a single JSON array to stdout. `src/sandbox.rs`
//! relies on exactly this shape rather than introspecting a dynamically
//! typed result.

use crate::domain::{ContextBinding, PropertyName, TypeSig};
use indoc::formatdoc;

/// Render the check source for `candidate` against `properties` in
/// `context` at `ty`. Property application order equals `properties`'
/// order (spec.md §4.2 "Determinism"); the output vector preserves it.
pub fn build_check_source(
    properties: &[PropertyName],
    context: &[ContextBinding],
    ty: &TypeSig,
    candidate_text: &str,
) -> String {
    let context_bindings: String = context
        .iter()
        .map(|b| format!("  let {} = {};\n", b.name, b.definition.text()))
        .collect();

    let property_checks: String = properties
        .iter()
        .map(|p| format!("    check_property({}, candidate),\n", p.0))
        .collect();

    formatdoc! {r#"
        -- generated by fixsynth::check_builder, no shrinking, silent mode
        fn __fixsynth_check() -> Vec<bool> {{
        {context_bindings}  let candidate: {ty} = {candidate};
          let __results = vec![
        {property_checks}  ];
          __results
        }}
    "#,
        context_bindings = context_bindings,
        ty = ty.0,
        candidate = candidate_text,
        property_checks = property_checks,
    }
}
