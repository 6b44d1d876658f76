//! Crate-wide error types.
//!
//! Rich, with-context errors (`FixsynthError`) cross the library/CLI
//! boundary; `cli/*.rs` wraps them in `anyhow::Result` at the point they
//! reach a human. Per-candidate failures never reach this type: per
//! spec.md §7 they are captured as a `Verdict` instead, so
//! `FixsynthError` only ever represents configuration or oracle-wiring
//! mistakes that should abort the run before the search starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixsynthError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("compiler oracle error: {0}")]
    Oracle(#[from] crate::oracle::OracleError),

    #[error("sandbox error: {0}")]
    Sandbox(String),

    #[error("problem file `{path}` is invalid: {reason}")]
    ProblemFile { path: String, reason: String },
}

pub type FixsynthResult<T> = Result<T, FixsynthError>;
