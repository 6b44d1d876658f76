//! Fix representation and application (C5). A fix is a finite, ordered
//! mapping from source spans to replacement expressions (spec.md §3, §4.5).
//!
//! Iteration order is part of the merge contract, so the backing store is
//! `indexmap::IndexMap` rather than `std::collections::HashMap`: the
//! no-overlap merge rule is defined in terms of "the iteration order of the
//! left fix then the filtered right fix", which a hash map cannot promise.

use crate::domain::{Expression, SourceSpan};
use crate::oracle::Oracle;
use indexmap::IndexMap;

/// `EFix`: spec.md's one shipped `Chromosome` instantiation (see
/// `crate::ga::Chromosome`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EFix {
    entries: IndexMap<SourceSpan, Expression>,
}

/// Structural equality includes iteration order (spec.md §9: "Winner
/// equality uses structural equality on fixes"), so `Hash` must walk
/// entries in the same order `PartialEq`'s derived impl does. `IndexMap`
/// has no blanket `Hash` impl, hence the manual one.
impl std::hash::Hash for EFix {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for (span, expr) in self.entries.iter() {
            span.hash(state);
            expr.hash(state);
        }
    }
}

impl EFix {
    /// The empty fix: "no change".
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn single(span: SourceSpan, expr: Expression) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(span, expr);
        Self { entries }
    }

    pub fn insert(&mut self, span: SourceSpan, expr: Expression) {
        self.entries.insert(span, expr);
    }

    pub fn remove(&mut self, span: &SourceSpan) -> Option<Expression> {
        self.entries.shift_remove(span)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceSpan, &Expression)> {
        self.entries.iter()
    }

    pub fn spans(&self) -> impl Iterator<Item = &SourceSpan> {
        self.entries.keys()
    }

    pub fn get_index(&self, i: usize) -> Option<(&SourceSpan, &Expression)> {
        self.entries.get_index(i)
    }

    /// Build a fix from an ordered list of entries, applying the same
    /// no-overlap rule as `merge` (earlier entries win over later ones
    /// whose span they strictly contain). Used to rebuild a fix from a
    /// crossover-spliced entry list (spec.md §4.7 "Crossover").
    pub fn from_entries(entries: Vec<(SourceSpan, Expression)>) -> Self {
        let mut out = EFix::empty();
        for (span, expr) in entries {
            out.insert_no_overlap(span, expr);
        }
        out
    }

    /// Insert `expr` at `span` unless some already-present span strictly
    /// contains it.
    fn insert_no_overlap(&mut self, span: SourceSpan, expr: Expression) {
        let shadowed = self.entries.keys().any(|existing| existing.strictly_contains(&span));
        if !shadowed {
            self.entries.insert(span, expr);
        }
    }

    /// `merge(a, b)`: concatenate `a`'s entries with `b`'s, filtered so
    /// that no entry of `b` has a span strictly contained in a span
    /// already present in `a`. Iteration order is `a` then filtered `b`
    /// (spec.md §3 "No-overlap on merge").
    pub fn merge(&self, other: &EFix) -> EFix {
        let mut out = self.clone();
        for (span, expr) in other.entries.iter() {
            out.insert_no_overlap(*span, expr.clone());
        }
        out
    }

    /// Apply this fix to `program` via the oracle's `replaceExpr`
    /// (spec.md §4.5): traverse spans in iteration order, substituting at
    /// each; spans already shadowed by an applied span are skipped by the
    /// oracle's own substitution logic operating over the up-to-date AST.
    pub fn apply(&self, oracle: &dyn Oracle, program: &Expression) -> Expression {
        oracle.replace_expr(self, program)
    }
}

impl FromIterator<(SourceSpan, Expression)> for EFix {
    fn from_iter<T: IntoIterator<Item = (SourceSpan, Expression)>>(iter: T) -> Self {
        let mut out = EFix::empty();
        for (span, expr) in iter {
            out.insert(span, expr);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(a: u32, b: u32) -> SourceSpan {
        SourceSpan::new(a, b)
    }

    fn expr(s: &str) -> Expression {
        Expression::new(s)
    }

    #[test]
    fn empty_fix_has_no_entries() {
        assert!(EFix::empty().is_empty());
    }

    #[test]
    fn merge_drops_right_entries_strictly_contained_in_left_spans() {
        let mut a = EFix::empty();
        a.insert(span(0, 10), expr("a"));

        let mut b = EFix::empty();
        b.insert(span(2, 5), expr("b")); // strictly inside a's span -> dropped
        b.insert(span(20, 30), expr("c")); // disjoint -> kept

        let merged = a.merge(&b);
        assert_eq!(merged.len(), 2);
        let spans: Vec<_> = merged.spans().copied().collect();
        assert_eq!(spans, vec![span(0, 10), span(20, 30)]);
    }

    #[test]
    fn merge_keeps_equal_spans_from_right_since_equal_is_not_strict_containment() {
        // spec.md: "if a span in the left fix strictly contains a span in
        // the right fix, the right entry is discarded" - equal spans are
        // not *strictly* contained, so b's entry for an identical span
        // shadows a's value for that span under IndexMap::insert semantics
        // applied in merge's iteration.
        let mut a = EFix::empty();
        a.insert(span(0, 10), expr("a"));
        let mut b = EFix::empty();
        b.insert(span(0, 10), expr("b"));

        let merged = a.merge(&b);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get_index(0).unwrap().1, &expr("b"));
    }

    #[test]
    fn merge_preserves_iteration_order_left_then_filtered_right() {
        let mut a = EFix::empty();
        a.insert(span(50, 60), expr("a1"));
        let mut b = EFix::empty();
        b.insert(span(0, 5), expr("b1"));
        b.insert(span(100, 110), expr("b2"));

        let merged = a.merge(&b);
        let spans: Vec<_> = merged.spans().copied().collect();
        assert_eq!(spans, vec![span(50, 60), span(0, 5), span(100, 110)]);
    }

    #[test]
    fn equal_fixes_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut a = EFix::empty();
        a.insert(span(0, 10), expr("a"));
        let mut b = EFix::empty();
        b.insert(span(0, 10), expr("a"));
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn from_entries_applies_no_overlap_rule_in_list_order() {
        let fixed = EFix::from_entries(vec![
            (span(0, 10), expr("outer")),
            (span(2, 4), expr("inner-dropped")),
            (span(20, 22), expr("kept")),
        ]);
        assert_eq!(fixed.len(), 2);
    }
}
