//! Tooling & Integration Layer
//!
//! Command-line surface and user-facing notices on top of the placement engine.

pub mod cli;
pub mod notices;

pub use cli::{Cli, CliContext, Commands};
pub use notices::ConsoleNotifier;
