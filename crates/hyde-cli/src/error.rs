//! Error handling for the Hyde CLI.
//!
//! This module provides a hierarchical error type system using `thiserror`.
//! The hierarchy mirrors how failures are treated at runtime:
//!
//! - **Top-level errors** (`CliError`) are what commands return. Startup
//!   failures such as a bind error surface here and end the process.
//! - **Domain-specific errors** (`ConfigError`, `BuildError`) carry the detail
//!   needed to act on a failure.
//! - **Context helpers** (`ResultExt`) attach paths and hints.
//!
//! # Example
//!
//! ```rust,no_run
//! use hyde_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_page(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Run the site build before previewing it")
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build pipeline errors (static copy or rebuild failed)
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server errors (bind failure, accept loop failure)
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a config.toml in the site root or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Config file uses a format Hyde cannot read
    #[error("Unsupported config format: {}\n\nHint: Use a .toml, .yaml, .yml or .json file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Build pipeline errors.
///
/// Raised by the static-asset copy and by the external rebuild command.
/// Inside the watch loop these are reported and the loop keeps running.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The rebuild command could not be started
    #[error("Failed to run `{command}`: {source}\n\nHint: Check the 'build_command' setting and that the program is on PATH")]
    CommandSpawn {
        /// The command line that was attempted
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The rebuild command exited unsuccessfully
    #[error("`{command}` exited with {status}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Exit status description
        status: String,
    },

    /// Copying a static asset into the publish directory failed
    #[error("Failed to copy {}: {source}\n\nHint: Check publish directory permissions", .path.display())]
    CopyFailed {
        /// The file or directory being copied
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A build action panicked or was cancelled
    #[error("Build task aborted: {0}")]
    Aborted(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a file path to the error context.
    ///
    /// A `NotFound` I/O error becomes [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Add a helpful hint to the error context.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a custom message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
