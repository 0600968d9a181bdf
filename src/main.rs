//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `nsreport` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing error formatting and exit status
//!
//! All reporting logic is implemented in the library crate.

use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use nsreport::initialization::init_logger;
use nsreport::{run_report, Config, Resolver};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logger(config.log_level.clone().into()).context("Failed to initialize logger")?;

    if let Err(e) = run(&config).await {
        eprintln!("nsreport: {e:#}");
        process::exit(1);
    }
    Ok(())
}

async fn run(config: &Config) -> Result<()> {
    let resolver =
        Resolver::new(config.resolver_options()?).context("Failed to initialize DNS resolver")?;
    let options = config.report_options();
    let mut out = io::stdout();
    run_report(&resolver, &config.domain, &options, &mut out).await
}
