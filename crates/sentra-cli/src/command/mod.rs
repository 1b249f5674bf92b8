//! Subcommand execution.

mod disease;
mod metrics;

use crate::config::{Cli, Command};
use crate::lifecycle;

/// Runs the parsed subcommand and prints its JSON output to stdout.
pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let output = match &cli.command {
        Command::Disease(command) => {
            let matcher = cli.dataset.load()?;
            disease::run(&matcher, command)?
        }
        Command::Metrics(command) => {
            let tracker = lifecycle::open_tracker(&cli.metrics).await?;
            let output = metrics::run(&tracker, command).await?;
            lifecycle::close_tracker(&tracker, &cli.metrics).await?;
            output
        }
    };

    println!("{output}");
    Ok(())
}
