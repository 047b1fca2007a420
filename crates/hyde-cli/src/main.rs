//! Hyde CLI entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use hyde_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let site_options = args.site_options();
    let result = match args.command {
        cli::Command::Server(server_args) => commands::server_execute(server_args, site_options).await,
    };

    // Render CLI errors as miette diagnostics
    result.map_err(error::cli_error_to_miette)
}
