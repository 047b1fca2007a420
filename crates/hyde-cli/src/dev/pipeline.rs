//! Build actions triggered by the change watcher.
//!
//! The watcher only decides *which* action to run; the actions themselves sit
//! behind [`BuildPipeline`]. [`SitePipeline`] is the binding used by the CLI:
//! it mirrors the static tree into the publish directory itself and delegates
//! rendering to the configured external build command.

use crate::dev::ServerConfig;
use crate::error::{BuildError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The two actions a change can trigger.
///
/// Implementations are called from a blocking thread, one action at a time.
pub trait BuildPipeline: Send + Sync + 'static {
    /// Copy the static-assets directory into the publish directory.
    fn copy_static(&self) -> Result<()>;

    /// Regenerate the publish directory from source.
    fn build_site(&self) -> Result<()>;
}

/// Static sync plus an external build command.
#[derive(Debug, Clone)]
pub struct SitePipeline {
    source_dir: PathBuf,
    static_dir: PathBuf,
    publish_dir: PathBuf,
    base_url: String,
    command: Vec<String>,
}

impl SitePipeline {
    /// Create a pipeline for `config`. An empty `command` disables rebuilds.
    pub fn new(config: &ServerConfig, command: Vec<String>) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            static_dir: config.static_dir.clone(),
            publish_dir: config.publish_dir.clone(),
            base_url: config.base_url.clone(),
            command,
        }
    }

    fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

impl BuildPipeline for SitePipeline {
    fn copy_static(&self) -> Result<()> {
        if !self.static_dir.is_dir() {
            debug!(
                "No static directory at {}, nothing to sync",
                self.static_dir.display()
            );
            return Ok(());
        }

        let copied = copy_tree(&self.static_dir, &self.publish_dir)?;
        debug!(
            "Copied {} static file(s) into {}",
            copied,
            self.publish_dir.display()
        );
        Ok(())
    }

    fn build_site(&self) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            warn!("No build_command configured; skipping rebuild");
            return Ok(());
        };

        debug!("Running `{}` in {}", self.command_line(), self.source_dir.display());

        let status = Command::new(program)
            .args(args)
            .current_dir(&self.source_dir)
            .env("HYDE_BASE_URL", &self.base_url)
            .env("HYDE_PUBLISH_DIR", &self.publish_dir)
            .status()
            .map_err(|source| BuildError::CommandSpawn {
                command: self.command_line(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::CommandFailed {
                command: self.command_line(),
                status: status.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Mirror every file under `src` into `dst`, creating directories as needed.
///
/// Existing files are overwritten; files only present in `dst` are left alone.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::CopyFailed {
            path: e.path().unwrap_or(src).to_path_buf(),
            source: e.into(),
        })?;

        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| BuildError::CopyFailed {
                path: target.clone(),
                source,
            })?;
        } else {
            fs::copy(entry.path(), &target).map_err(|source| BuildError::CopyFailed {
                path: entry.path().to_path_buf(),
                source,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
