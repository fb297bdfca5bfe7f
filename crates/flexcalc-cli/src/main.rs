mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::Cli;
use crate::config::PartialAppConfig;
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("flexcalc v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let partial_config = PartialAppConfig::load(cli.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&cli)?;
    debug!("Resolved configuration: {:?}", &app_config);

    let result = commands::analyze::run(&app_config);
    match &result {
        Ok(()) => info!("Analysis completed successfully."),
        Err(e) => error!("Analysis failed: {}", e),
    }
    result
}
