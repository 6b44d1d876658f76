//! Core data model shared by every component: spans, expressions, problems,
//! fits, holes and verdicts. See spec.md §3.

use std::fmt;

/// An opaque, totally ordered identifier of a source region.
///
/// Concretely a half-open byte range into the problem's repair site. Real
/// oracle implementations are free to pack whatever addressing scheme they
/// like into `start`/`end` as long as `contains` keeps its enclosing
/// semantics; the driver never interprets these fields itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// `a.contains(b)`: a strictly or equally encloses b.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Strict containment: encloses but is not equal to `other`.
    pub fn strictly_contains(&self, other: &SourceSpan) -> bool {
        self.contains(other) && self != other
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Opaque AST node of the target language, carried around as its canonical
/// rendered text. Rendering and hole substitution are services the oracle
/// performs on this representation (spec.md §3); `Expression` itself is an
/// inert, cheaply cloned value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression(pub String);

impl Expression {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque declared type, carried as its canonical rendered text. Used as a
/// cache key, so it must be `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSig(pub String);

impl TypeSig {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named predicate source, e.g. `prop_is_sum`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName(pub String);

impl PropertyName {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An auxiliary binding visible to both program and properties, e.g.
/// `zero = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextBinding {
    pub name: String,
    pub definition: Expression,
}

impl ContextBinding {
    pub fn new(name: impl Into<String>, definition: Expression) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }
}

/// `{ program, type, properties[], context[] }` (spec.md §3). `program` is
/// an expression with exactly one designated repair site, identified by
/// `repair_site`.
#[derive(Debug, Clone)]
pub struct Problem {
    pub program: Expression,
    pub repair_site: SourceSpan,
    pub ty: TypeSig,
    pub properties: Vec<PropertyName>,
    pub context: Vec<ContextBinding>,
}

impl Problem {
    pub fn new(
        program: Expression,
        repair_site: SourceSpan,
        ty: TypeSig,
        properties: Vec<PropertyName>,
        context: Vec<ContextBinding>,
    ) -> Self {
        Self {
            program,
            repair_site,
            ty,
            properties,
            context,
        }
    }
}

/// A skeleton and the ordered list of sub-hole types still to fill.
#[derive(Debug, Clone)]
pub struct Hole {
    pub skeleton: Expression,
    pub sub_hole_types: Vec<TypeSig>,
}

/// A candidate expression returned by the oracle as a well-typed filling at
/// a given site. `sub_holes` is non-empty when the oracle was invoked at a
/// hole-nesting level >= 1 and the fit still contains holes to fill.
#[derive(Debug, Clone)]
pub struct Fit {
    pub expr: Expression,
    pub sub_holes: Vec<TypeSig>,
}

impl Fit {
    pub fn direct(expr: Expression) -> Self {
        Self {
            expr,
            sub_holes: Vec::new(),
        }
    }

    pub fn is_direct(&self) -> bool {
        self.sub_holes.is_empty()
    }
}

/// A program rewrite where one subexpression has been replaced by a hole,
/// tagged with the source span the hole occupies.
#[derive(Debug, Clone)]
pub struct HoleyExpression {
    pub holey_text: Expression,
    pub site: SourceSpan,
}

/// Tagged outcome of running a candidate's property checks (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    AllPass,
    AllFail,
    Partial(Vec<bool>),
    Timeout,
    WrongShape,
}

impl Verdict {
    pub fn is_winner(&self) -> bool {
        matches!(self, Verdict::AllPass)
    }

    /// Number of properties that passed, when known.
    pub fn pass_count(&self) -> Option<usize> {
        match self {
            Verdict::Partial(bits) => Some(bits.iter().filter(|b| **b).count()),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AllPass => write!(f, "AllPass"),
            Verdict::AllFail => write!(f, "AllFail"),
            Verdict::Partial(bits) => write!(f, "Partial({bits:?})"),
            Verdict::Timeout => write!(f, "Timeout"),
            Verdict::WrongShape => write!(f, "WrongShape"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_contains_is_reflexive_and_strict() {
        let a = SourceSpan::new(0, 10);
        let b = SourceSpan::new(2, 5);
        assert!(a.contains(&a));
        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert!(a.strictly_contains(&b));
        assert!(!a.strictly_contains(&a));
    }

    #[test]
    fn verdict_pass_count_only_defined_for_partial() {
        assert_eq!(Verdict::AllPass.pass_count(), None);
        assert_eq!(Verdict::Partial(vec![true, false, true]).pass_count(), Some(2));
    }
}
