use std::process::ExitCode;

use clap::Parser;

mod commands;

use commands::Command;
use sluice_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "sluice",
    version,
    about = "Batch line records into tagged envelopes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => commands::run::run(args),
        Command::Inspect(args) => commands::inspect::run(args),
    }
}
