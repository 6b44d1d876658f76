//! The compiler oracle: the external collaborator spec.md §1 and §6 treat as
//! out of scope. `fixsynth` never parses, type-checks or compiles the
//! target language itself — every operation that needs to understand the
//! target language's syntax or semantics goes through this trait.
//!
//! Implementations are expected to be stateful (an incremental compiler
//! session, a REPL, a persistent worker process); hence every method that
//! can trigger a compile takes `&mut self` and the driver never calls two
//! oracle methods concurrently (spec.md §5).

use crate::domain::{Expression, Fit, Hole, HoleyExpression, Problem, SourceSpan, TypeSig, Verdict};
use crate::fix::EFix;
use thiserror::Error;

/// Per-call oracle configuration: the hole-nesting level the oracle should
/// use when producing fits, and whether to emit its own verbose trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OracleConfig {
    pub hole_level: u32,
    pub debug: bool,
}

impl OracleConfig {
    pub fn new(hole_level: u32) -> Self {
        Self {
            hole_level,
            debug: false,
        }
    }

    pub fn at_level(&self, hole_level: u32) -> Self {
        Self {
            hole_level,
            ..*self
        }
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("compiler oracle failed to compile `{expr}` at type `{ty}`: {reason}")]
    CompileAtType {
        expr: String,
        ty: String,
        reason: String,
    },
    #[error("compiler oracle failed to compile a check: {0}")]
    CompileCheck(String),
    #[error("compiler oracle failed to parse `{0}`")]
    Parse(String),
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Returned by `compile_at_type`: value fits (direct expressions of the
/// required type) and refinement fits (skeletons with typed sub-holes).
/// Spec.md §4.3 step 4 calls these `(directFits, reusableHoles)`.
#[derive(Debug, Clone, Default)]
pub struct FitSet {
    pub direct_fits: Vec<Fit>,
    pub reusable_holes: Vec<Hole>,
}

/// A compiled, runnable property check, ready for the sandbox (C1). Kept
/// abstract in the trait signature so a real backend can hand back
/// whatever it needs (a path to a freshly-linked binary, an in-process
/// closure token, ...); `src/sandbox.rs` only requires that it be turned
/// into a `subprocess::Exec`-compatible command via `CompiledCheck::exec`.
pub struct CompiledCheck {
    pub program: String,
    pub args: Vec<String>,
}

impl CompiledCheck {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// The ten operations of spec.md §6, as a single object-safe trait.
pub trait Oracle {
    /// `compileAtType`: well-typed fits and refinement skeletons for `ty`
    /// in `context`.
    fn compile_at_type(
        &mut self,
        cfg: &OracleConfig,
        expr_text: &str,
        ty: &TypeSig,
    ) -> OracleResult<FitSet>;

    /// `monomorphiseType`: concretize a (possibly polymorphic) type, or
    /// `None` if it cannot be monomorphized.
    fn monomorphise_type(&mut self, cfg: &OracleConfig, ty: &TypeSig) -> Option<TypeSig>;

    /// `compileChecks`: compile each check source into a runnable thunk.
    fn compile_checks(
        &mut self,
        cfg: &OracleConfig,
        check_sources: &[String],
    ) -> OracleResult<Vec<CompiledCheck>>;

    /// `getHoley`: every subexpression candidate for replacement, as
    /// `(wholeWithHole, siteSpan)`.
    fn get_holey(&mut self, cfg: &OracleConfig, expr_text: &str) -> Vec<HoleyExpression>;

    /// `getHoleFits`: well-typed fits for the hole in a holey expression.
    fn get_hole_fits(&mut self, cfg: &OracleConfig, holey: &HoleyExpression) -> Vec<Fit>;

    /// `fillHole`: substitute the unique hole, or `None` if `holey` has no
    /// hole (or more than one).
    fn fill_hole(&self, holey: &HoleyExpression, expr: &Expression) -> Option<Expression>;

    /// `replacements`: Cartesian enumeration over multiple holes.
    fn replacements(&self, holey: &HoleyExpression, fits: &[Fit]) -> Vec<Expression>;

    /// `replaceExpr`: apply an `EFix` to `program`.
    fn replace_expr(&self, fix: &EFix, program: &Expression) -> Expression;

    /// `parseExpr`.
    fn parse_expr(&mut self, cfg: &OracleConfig, text: &str) -> OracleResult<Expression>;

    /// `showUnsafe`: canonical rendering.
    fn show_unsafe(&self, expr: &Expression) -> String;

    /// `checkFixes`: batch run-check variant, used by the winner-
    /// correctness re-check (spec.md §8 property 4) and by
    /// `fitness::recompute` when no verdict was supplied.
    fn check_fixes(
        &mut self,
        cfg: &OracleConfig,
        problem: &Problem,
        candidate_programs: &[Expression],
    ) -> Vec<Verdict>;
}

/// Marker span used by generic call sites that need *a* span but have no
/// specific subexpression in mind (e.g. constructing a whole-program hole).
pub fn whole_program_span(program: &Expression) -> SourceSpan {
    SourceSpan::new(0, program.text().len() as u32)
}
