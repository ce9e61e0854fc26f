//! mesh-resilience - operator tool for the resilience core
//!
//! Replays dependency graph scenarios and exercises the retry classifier and the
//! adaptive backoff engine from the command line.

#![allow(missing_docs)]

mod cli;

use clap::Parser;
use cli::{CliArgs, Commands};
use mesh_resilience::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = cli::load_config(args.config.as_ref()).await?;

    // Initialize logging system
    init_logging(&config.logging)?;

    match &args.command {
        Commands::Simulate(simulate) => println!("{}", cli::simulate(&config, simulate).await?),
        Commands::Classify(classify) => println!("{}", cli::classify(&config, classify)?),
        Commands::Backoff(backoff) => {
            for line in cli::backoff(&config, backoff)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
