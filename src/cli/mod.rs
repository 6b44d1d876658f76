// CLI module for the unified fxs command
//
// This module provides the implementation for all CLI subcommands.

pub mod evolve;
pub mod repair;
pub mod synth;
