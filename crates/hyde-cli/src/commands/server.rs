//! Server command implementation.
//!
//! Orchestrates a preview run:
//! - Resolve the site and run configuration
//! - Bind the HTTP listener (fatal on failure)
//! - Optionally create the change watcher over the site directories
//! - Serve until Ctrl+C, dispatching change events while watching

use crate::cli::ServerArgs;
use crate::config::{get_dir_list, SiteConfig, SiteOptions};
use crate::dev::{
    start_watcher, BuildPipeline, ChangeWatcher, Dispatcher, FileServer, PublishGuard, RunStats,
    ServerConfig, Shutdown, SitePipeline,
};
use crate::error::{CliError, Result};
use crate::ui;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::debug;

/// Execute the server command.
///
/// # Errors
///
/// Returns errors for:
/// - Port 0
/// - Invalid or unreadable configuration
/// - A port that cannot be bound
/// - The HTTP server failing while running
///
/// A watcher that cannot be created is reported and the site is served
/// without watching.
pub async fn execute(args: ServerArgs, options: SiteOptions) -> Result<()> {
    if args.port == 0 {
        return Err(CliError::InvalidArgument(
            "--port must be between 1 and 65535".to_string(),
        ));
    }

    let site = SiteConfig::load(&options)?;
    let config = ServerConfig::resolve(&site, args.port, args.watch);
    debug!(
        "Serving {} at {} (base URL {})",
        config.publish_dir.display(),
        config.server_url(),
        config.base_url
    );

    let listener = FileServer::bind(config.addr()).await?;
    let watcher = start_watcher(&config, &get_dir_list(&site), ChangeWatcher::new);
    let pipeline: Arc<dyn BuildPipeline> =
        Arc::new(SitePipeline::new(&config, site.build_command.clone()));

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ui::info("Shutting down...");
            signal.trigger();
        }
    });

    let stats = run(config, pipeline, watcher, listener, shutdown).await?;
    if args.watch {
        debug!(
            "Watcher handled {} static sync(s), {} rebuild(s), {} error(s)",
            stats.copies, stats.rebuilds, stats.errors
        );
    }

    Ok(())
}

/// Serve on `listener` and, with a watcher, run its event loop alongside.
///
/// Returns when `shutdown` fires or the HTTP server fails. Without a watcher
/// the returned stats are all zero.
pub async fn run(
    config: ServerConfig,
    pipeline: Arc<dyn BuildPipeline>,
    watcher: Option<ChangeWatcher>,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<RunStats> {
    let guard = PublishGuard::new();
    let server = FileServer::new(config.clone(), guard.clone());

    let Some(watcher) = watcher else {
        server.serve(listener, shutdown.subscribe()).await?;
        return Ok(RunStats::default());
    };

    let mut server_task = tokio::spawn(server.serve(listener, shutdown.subscribe()));
    let dispatcher = Dispatcher::new(pipeline, &config, guard);

    let stats = tokio::select! {
        stats = watcher.run(&dispatcher, shutdown.subscribe()) => stats,
        joined = &mut server_task => {
            shutdown.trigger();
            server_result(joined)?;
            return Ok(RunStats::default());
        }
    };

    shutdown.trigger();
    server_result(server_task.await)?;
    Ok(stats)
}

fn server_result(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(|e| CliError::Server(format!("Server task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::{ChangeEvent, ChangeKind};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::{sleep, timeout};

    #[derive(Default)]
    struct Counting {
        copies: AtomicUsize,
        rebuilds: AtomicUsize,
    }

    impl BuildPipeline for Counting {
        fn copy_static(&self) -> Result<()> {
            self.copies.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn build_site(&self) -> Result<()> {
            self.rebuilds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config_for(root: &Path, watch: bool) -> ServerConfig {
        let site = SiteConfig {
            source: root.to_path_buf(),
            ..SiteConfig::default()
        };
        ServerConfig::resolve(&site, 0, watch)
    }

    async fn local_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_run_without_watcher_stops_on_shutdown() {
        let temp = TempDir::new().unwrap();
        let shutdown = Shutdown::new();
        let task = tokio::spawn(run(
            config_for(temp.path(), false),
            Arc::new(Counting::default()),
            None,
            local_listener().await,
            shutdown.clone(),
        ));

        sleep(Duration::from_millis(50)).await;
        shutdown.trigger();

        let stats = timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
        assert_eq!(stats, RunStats::default());
    }

    #[tokio::test]
    async fn test_run_with_watcher_dispatches_events() {
        let config = config_for(Path::new("/site"), true);
        let counting = Arc::new(Counting::default());
        let watcher = ChangeWatcher::new(0).unwrap();
        let events = watcher.event_sender();
        let shutdown = Shutdown::new();

        let task = tokio::spawn(run(
            config,
            counting.clone(),
            Some(watcher),
            local_listener().await,
            shutdown.clone(),
        ));

        events
            .send(ChangeEvent::new("/site/static/css/a.css", ChangeKind::Modify))
            .unwrap();
        events
            .send(ChangeEvent::new(PathBuf::from("/site/content/post.md"), ChangeKind::Modify))
            .unwrap();

        timeout(Duration::from_secs(5), async {
            while counting.copies.load(Ordering::SeqCst) + counting.rebuilds.load(Ordering::SeqCst) < 2 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        shutdown.trigger();

        let stats = timeout(Duration::from_secs(5), task).await.unwrap().unwrap().unwrap();
        assert_eq!(stats.copies, 1);
        assert_eq!(stats.rebuilds, 1);
        assert_eq!(counting.copies.load(Ordering::SeqCst), 1);
        assert_eq!(counting.rebuilds.load(Ordering::SeqCst), 1);
    }
}
