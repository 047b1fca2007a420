//! Command-line interface definition for Hyde.
//!
//! Defines the CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `hyde server` - Serve the publish directory, optionally rebuilding on change

mod commands;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{Command, ServerArgs};

use crate::config::SiteOptions;

/// Hyde - preview a static site while you write it
#[derive(Parser, Debug)]
#[command(
    name = "hyde",
    version,
    about = "Preview a static site while you write it",
    long_about = "Hyde serves the rendered output of a static site over HTTP.\n\
                  With --watch it also watches the site sources and, on every change,\n\
                  either re-syncs static assets or rebuilds the whole site."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every filesystem event, every watch registration (including the
    /// ones that fail) and every HTTP request.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Site root directory
    ///
    /// Content, layout, static and publish directories are resolved
    /// relative to this directory.
    #[arg(short, long, global = true, default_value = ".", value_name = "DIR")]
    pub source: PathBuf,

    /// Config file to use instead of config.{toml,yaml,json} in the site root
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL the site is rendered for
    ///
    /// Defaults to the config file value, then to http://localhost:<port>.
    #[arg(short, long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Site-wide options shared by every subcommand.
    pub fn site_options(&self) -> SiteOptions {
        SiteOptions {
            source: self.source.clone(),
            config: self.config.clone(),
            base_url: self.base_url.clone(),
        }
    }
}
