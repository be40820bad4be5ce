//! CLI argument surface: two subcommands, `run` for a single one-shot
//! orchestration and `serve` for the HTTP submission queue front-end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Parallel web-application QA orchestration engine", long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Log level (trace, debug, info, warn, error); overridden by RUST_LOG.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one orchestration session to completion and exit.
    Run(RunArgs),
    /// Start the submission queue worker and HTTP front-end.
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Declarative config file (TOML or YAML) describing the input
    /// config: target_url, llm, test_configurations, max_concurrent_tests.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overrides `target_url` from the config file, if set.
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port the HTTP submission surface listens on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}
