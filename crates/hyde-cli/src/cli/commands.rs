use crate::config::DEFAULT_PORT;
use clap::{Args, Subcommand};

/// Available Hyde subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the site's publish directory over HTTP
    ///
    /// Runs a local web server for the rendered site. With --watch, changes
    /// under the content, layout and static directories trigger a static
    /// sync or a full rebuild.
    Server(ServerArgs),
}

/// Arguments for the server command
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Port to run the server on
    #[arg(short, long, default_value_t = DEFAULT_PORT, value_name = "PORT")]
    pub port: u16,

    /// Watch filesystem for changes and recreate as needed
    #[arg(short, long)]
    pub watch: bool,
}
