//! Microscopium CLI - serve the screen browser from the command line.

use clap::Parser;

use microscopium_cli::cli::{Cli, Command};
use microscopium_cli::commands;
use microscopium_cli::error::CliResult;
use microscopium_cli::output;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Check(args) => commands::check::run(args).await,
        Command::Version => commands::version::run().await,
    }
}
