use bingo_api::Cli;
use bingo_api::tracing_setup::init_tracing;
use clap::Parser;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.tracing_config())?;
    bingo_core::init()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting bingo");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = cli.execute(&mut out) {
        error!(error = %format!("{err:#}"), "Command failed");
        return Err(err);
    }
    Ok(())
}
