mod cli;
mod commands;
mod libs;
mod logger;
mod schemas;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use colored::Colorize;
use commands::{install, status, version, versions};

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);
    log_debug!("Debug mode enabled.");

    let result = match cli.command {
        Commands::Version => {
            version::run();
            Ok(())
        }
        Commands::Install(args) => install::run(args),
        Commands::Status(args) => status::run(args),
        Commands::Versions(args) => versions::run(args),
    };

    if let Err(e) = result {
        log_error!("{:#}", e);
        std::process::exit(1);
    }
}
