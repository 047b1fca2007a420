//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Server(msg) => miette::miette!(
            "Server error: {}\n\nHint: Pick another port with --port or stop the process using it",
            msg
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::CommandFailed { command, status } => {
            miette::miette!(
                "Build command `{}` failed ({})\n\nHint: Run the command by hand to see its full output",
                command,
                status
            )
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_gets_port_hint() {
        let report = cli_error_to_miette(CliError::Server("Failed to bind to 0.0.0.0:1313".into()));
        let msg = format!("{}", report);
        assert!(msg.contains("0.0.0.0:1313"));
        assert!(msg.contains("--port"));
    }

    #[test]
    fn test_build_command_failure_report() {
        let report = cli_error_to_miette(CliError::Build(BuildError::CommandFailed {
            command: "make".into(),
            status: "exit status: 1".into(),
        }));
        assert!(format!("{}", report).contains("`make`"));
    }
}
