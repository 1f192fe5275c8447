//! Bingo operator command line
//!
//! Loads a session file (engine settings, pattern selection, cards), drives a
//! [`bingo_core::SessionController`] and prints calls, verdicts and audit
//! results. All game rules live in `bingo-core`.

pub mod cli;
pub mod config;
pub mod tracing_setup;

pub use cli::{Cli, Command, OutputFormat};
pub use config::SessionFile;
