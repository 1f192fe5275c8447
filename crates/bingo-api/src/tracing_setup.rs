//! Logging setup for the command line
//!
//! Logs go to stderr so that verdicts and summaries on stdout stay pipeable.
//! `RUST_LOG` wins over the defaults chosen here.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Logging options taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Default to debug level for the bingo crates
    pub verbose: bool,
}

impl TracingConfig {
    fn default_directive(self) -> &'static str {
        if self.verbose { "bingo=debug,warn" } else { "bingo=info,warn" }
    }

    pub fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Install the global subscriber
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
