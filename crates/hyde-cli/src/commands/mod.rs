//! Command implementations for the Hyde CLI.
//!
//! - [`server`] - Serve the publish directory, optionally rebuilding on change
//!
//! Each command provides an `execute` function that takes the parsed command
//! arguments and returns a Result.

pub mod server;

pub use server::execute as server_execute;
