//! Routing of change events to build actions.
//!
//! A change under the static-assets directory re-syncs static files; any
//! other change rebuilds the site. Exactly one of the two runs per event.

use crate::dev::{BuildPipeline, ChangeEvent, PublishGuard, ServerConfig};
use crate::error::{BuildError, Result};
use crate::ui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Action chosen for a single change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildAction {
    /// Copy static assets into the publish directory
    CopyStatic,
    /// Regenerate the whole site
    Rebuild,
}

/// Choose the action for `path`.
///
/// The prefix test is per path component, so `static2/a.css` is not under
/// `static`.
pub fn classify(path: &Path, static_dir: &Path) -> BuildAction {
    if path.starts_with(static_dir) {
        BuildAction::CopyStatic
    } else {
        BuildAction::Rebuild
    }
}

/// Runs the chosen action against a [`BuildPipeline`].
#[derive(Clone)]
pub struct Dispatcher {
    pipeline: Arc<dyn BuildPipeline>,
    static_dir: PathBuf,
    guard: PublishGuard,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<dyn BuildPipeline>, config: &ServerConfig, guard: PublishGuard) -> Self {
        Self {
            pipeline,
            static_dir: config.static_dir.clone(),
            guard,
        }
    }

    /// Classify `event` and run the matching action to completion.
    ///
    /// The action runs on a blocking thread while the publish guard's write
    /// lease is held. Failures are reported, never propagated: a broken
    /// rebuild must not stop the watcher.
    pub async fn dispatch(&self, event: &ChangeEvent) -> BuildAction {
        let action = classify(&event.path, &self.static_dir);
        match action {
            BuildAction::CopyStatic => ui::info("Static file changed, syncing"),
            BuildAction::Rebuild => ui::info("Change detected, rebuilding site"),
        }

        let started = Instant::now();
        match self.run(action).await {
            Ok(()) => {
                let elapsed = ui::format_duration(started.elapsed());
                match action {
                    BuildAction::CopyStatic => ui::success(&format!("Static files synced in {}", elapsed)),
                    BuildAction::Rebuild => ui::success(&format!("Site rebuilt in {}", elapsed)),
                }
            }
            Err(e) => ui::error(&format!("{:?} failed: {}", action, e)),
        }

        action
    }

    async fn run(&self, action: BuildAction) -> Result<()> {
        let _lease = self.guard.write().await;
        debug!("Publish directory locked for {:?}", action);

        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || match action {
            BuildAction::CopyStatic => pipeline.copy_static(),
            BuildAction::Rebuild => pipeline.build_site(),
        })
        .await
        .map_err(|e| BuildError::Aborted(e.to_string()))?
    }
}
