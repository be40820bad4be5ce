use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::env::{CliArgs, Commands};
use super::runtime;
use super::{run, serve};

pub async fn run() -> Result<()> {
    let _logging_guards = runtime::init_logging()?;
    runtime::init_metrics();

    let cli = CliArgs::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "starting webqa-engine");

    let result = match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Serve(args) => serve::serve(args).await,
    };

    if let Err(ref err) = result {
        error!(error = %err, "command failed");
    }
    result
}
