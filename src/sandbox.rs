//! Sandboxed Check Runner (C1, spec.md §4.1).
//!
//! Candidates may be non-productive (`last (repeat head)`); cooperative
//! in-process cancellation is insufficient because the checked code is not
//! guaranteed to reach a scheduling point. Every check therefore runs in
//! its own child process, isolated by `subprocess::Exec`, and is killed
//! outright if it outruns its wall-clock budget. Process isolation also
//! keeps a misbehaving candidate (heap corruption, an uncaught native
//! fault) from ever touching the host process.
//!
//! The child is expected to print a single line of JSON — an array of
//! booleans, one per property, in the order `check_builder` generated them
//! — to stdout and exit 0. Any other observable outcome classifies as
//! `AllFail`, `Timeout` or `WrongShape`; the runner never propagates an
//! `Err` up past its own boundary (spec.md §7: "no panics across the trust
//! boundary").

use crate::domain::Verdict;
use crate::oracle::CompiledCheck;
use std::io::Read;
use std::time::Duration;
use subprocess::{Exec, Redirection};

/// Default wall-clock budget per check: 1,000,000 microseconds.
pub const DEFAULT_BUDGET: Duration = Duration::from_micros(1_000_000);

pub struct SandboxConfig {
    pub budget: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
        }
    }
}

/// Run one compiled check to completion or timeout, returning its verdict.
pub fn run_check(check: &CompiledCheck, cfg: &SandboxConfig) -> Verdict {
    let popen = Exec::cmd(&check.program)
        .args(&check.args)
        .stdout(Redirection::Pipe)
        .stderr(Redirection::Merge)
        .popen();

    let mut popen = match popen {
        Ok(p) => p,
        Err(_) => return Verdict::AllFail,
    };

    let status = match popen.wait_timeout(cfg.budget) {
        Ok(status) => status,
        Err(_) => {
            let _ = popen.kill();
            let _ = popen.wait();
            return Verdict::AllFail;
        }
    };

    let Some(status) = status else {
        // Budget exhausted: hard-kill and reap so no child is ever leaked.
        let _ = popen.kill();
        let _ = popen.wait();
        return Verdict::Timeout;
    };

    if !status.success() {
        return Verdict::AllFail;
    }

    let mut stdout = String::new();
    if let Some(mut reader) = popen.stdout.take() {
        if reader.read_to_string(&mut stdout).is_err() {
            return Verdict::WrongShape;
        }
    }

    classify_stdout(&stdout)
}

fn classify_stdout(stdout: &str) -> Verdict {
    let line = stdout.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    match serde_json::from_str::<Vec<bool>>(line.trim()) {
        Ok(bits) if bits.is_empty() => Verdict::WrongShape,
        Ok(bits) if bits.iter().all(|b| *b) => Verdict::AllPass,
        Ok(bits) if bits.iter().all(|b| !*b) => Verdict::AllFail,
        Ok(bits) => Verdict::Partial(bits),
        Err(_) => Verdict::WrongShape,
    }
}
