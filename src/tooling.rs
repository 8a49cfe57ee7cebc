//! Tooling & Integration Layer
//!
//! The command-line surface over the project store, compiler, preview and
//! editor bridge.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
