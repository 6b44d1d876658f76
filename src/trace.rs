//! `-fdebug` trace helper (spec.md §6). Prints a dimmed, timestamp-free
//! line to stderr when enabled, in the same `colored` idiom the CLI uses
//! for its status lines (e.g. `cli/build.rs`'s `"Building".green().bold()`
//! in the teacher crate).
//!
//! Call sites thread `OracleConfig.debug` (or a CLI arg's `debug` field)
//! straight through rather than reading any global state, matching
//! spec.md §9's "avoid any global mutable state".

use colored::Colorize;

pub fn trace(enabled: bool, msg: impl std::fmt::Display) {
    if enabled {
        eprintln!("{}", format!("[fixsynth] {msg}").dimmed());
    }
}
