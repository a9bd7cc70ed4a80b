mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::CliConfig;
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("🚀 DIT v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config = CliConfig::load(cli.config.as_deref())?;

    let command_result = match cli.command {
        Commands::Xvg(args) => {
            info!("Dispatching to 'xvg' command.");
            commands::xvg::run(args, &config)
        }
        Commands::Xpm(args) => {
            info!("Dispatching to 'xpm' command.");
            commands::xpm::run(args, &config)
        }
        Commands::Ndx(args) => {
            info!("Dispatching to 'ndx' command.");
            commands::ndx::run(args)
        }
        Commands::Dccm(args) => {
            info!("Dispatching to 'dccm' command.");
            commands::dccm::run(args, &config)
        }
        Commands::Hbond(args) => {
            info!("Dispatching to 'hbond' command.");
            commands::hbond::run(args)
        }
        Commands::Data(args) => {
            info!("Dispatching to 'data' command.");
            commands::data::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
