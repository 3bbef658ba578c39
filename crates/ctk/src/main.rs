//! `ctk`: CrateDB Toolkit command line.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use cratedb_toolkit::cli::{Cli, run};
use cratedb_toolkit::{ToolkitConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.debug, args.verbose);

    let paths = args.config.config_paths();
    debug!("Loading config from {} source(s)", paths.len());
    let config = match ToolkitConfig::from_paths(&paths) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
