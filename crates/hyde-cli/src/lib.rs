//! Hyde CLI - preview a static site while you write it.
//!
//! `hyde server` serves a site's publish directory over HTTP. With `--watch`
//! it also monitors the content, layout and static directories and, for each
//! change, either re-syncs static assets or rebuilds the site.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line definition
//! - [`commands`] - Command implementations
//! - [`config`] - Site configuration (file, `HYDE_*` environment, flags)
//! - [`dev`] - File server, change watcher and build dispatch
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status output
//!
//! # Example
//!
//! ```rust
//! use hyde_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
