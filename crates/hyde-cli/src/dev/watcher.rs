//! File system watcher for preview mode.
//!
//! Each directory is registered on its own (non-recursive), so the watch set
//! is exactly the directory list handed to [`ChangeWatcher::start_watch`] plus
//! whatever [`ChangeWatcher::add_watch`] adds later. Directories created while
//! the watcher runs are registered as their create events arrive.
//!
//! Notifications arrive on two channels, one for change events and one for
//! watcher-internal errors. Both are unbounded: the notify thread must never
//! wait on the event loop, because `watch()` and `unwatch()` wait on the
//! notify thread. [`ChangeWatcher::run`] consumes both in delivery
//! order until shutdown is requested.

use crate::config::collect_dirs;
use crate::dev::{BuildAction, Dispatcher, ServerConfig};
use crate::error::{CliError, Result};
use crate::ui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Kind of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Remove,
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Modify(_) => ChangeKind::Modify,
            EventKind::Remove(_) => ChangeKind::Remove,
            _ => ChangeKind::Other,
        }
    }
}

/// A single filesystem notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A directory known to the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    /// `false` when registration failed or the directory was unwatched
    pub registered: bool,
}

/// Counters returned when the event loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub copies: usize,
    pub rebuilds: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl RunStats {
    fn record(&mut self, action: BuildAction) {
        match action {
            BuildAction::CopyStatic => self.copies += 1,
            BuildAction::Rebuild => self.rebuilds += 1,
        }
    }
}

/// Directory registrations, shared between the watcher and its handles.
struct Registry {
    watcher: RecommendedWatcher,
    targets: BTreeMap<PathBuf, WatchTarget>,
}

impl Registry {
    fn is_watched(&self, path: &Path) -> bool {
        self.targets
            .get(path)
            .map(|target| target.registered)
            .unwrap_or(false)
    }

    fn add(&mut self, path: &Path) -> Result<bool> {
        if self.is_watched(path) {
            return Ok(false);
        }

        let outcome = self.watcher.watch(path, RecursiveMode::NonRecursive);
        self.targets.insert(
            path.to_path_buf(),
            WatchTarget {
                path: path.to_path_buf(),
                registered: outcome.is_ok(),
            },
        );

        outcome.map_err(CliError::Watch)?;
        debug!("Watching {}", path.display());
        Ok(true)
    }

    fn remove(&mut self, path: &Path) -> bool {
        match self.targets.get_mut(path) {
            Some(target) if target.registered => {
                // The OS may already have dropped the watch for a removed directory.
                let _ = self.watcher.unwatch(path);
                target.registered = false;
                debug!("Stopped watching {}", path.display());
                true
            }
            _ => false,
        }
    }
}

/// Cloneable handle for changing the watch set while the event loop runs.
#[derive(Clone)]
pub struct WatchHandle {
    registry: Arc<Mutex<Registry>>,
}

impl WatchHandle {
    /// Register one more directory.
    ///
    /// Returns `Ok(false)` when the directory is already watched.
    pub fn add_watch(&self, path: &Path) -> Result<bool> {
        self.registry.lock().add(path)
    }

    /// Stop watching `path`. Returns `false` if it was not watched.
    pub fn unwatch(&self, path: &Path) -> bool {
        self.registry.lock().remove(path)
    }

    /// Whether `path` is currently registered.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.registry.lock().is_watched(path)
    }

    /// Currently registered directories, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.registry
            .lock()
            .targets
            .values()
            .filter(|target| target.registered)
            .map(|target| target.path.clone())
            .collect()
    }

    /// Every directory the watcher has seen, registered or not.
    pub fn targets(&self) -> Vec<WatchTarget> {
        self.registry.lock().targets.values().cloned().collect()
    }
}

/// Watches a set of directories and feeds changes to a [`Dispatcher`].
pub struct ChangeWatcher {
    handle: WatchHandle,
    event_tx: mpsc::UnboundedSender<ChangeEvent>,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    error_tx: mpsc::UnboundedSender<notify::Error>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    debounce: Duration,
    last_event: Option<(PathBuf, Instant)>,
}

impl ChangeWatcher {
    /// Create the OS watcher.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Watch`] if the platform watcher cannot be created.
    pub fn new(debounce_ms: u64) -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();

        let callback_events = event_tx.clone();
        let callback_errors = error_tx.clone();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let kind = ChangeKind::from(&event.kind);
                for path in event.paths {
                    let _ = callback_events.send(ChangeEvent { path, kind });
                }
            }
            Err(err) => {
                let _ = callback_errors.send(err);
            }
        })
        .map_err(CliError::Watch)?;

        let registry = Registry {
            watcher,
            targets: BTreeMap::new(),
        };

        Ok(Self {
            handle: WatchHandle {
                registry: Arc::new(Mutex::new(registry)),
            },
            event_tx,
            events,
            error_tx,
            errors,
            debounce: Duration::from_millis(debounce_ms),
            last_event: None,
        })
    }

    /// Register every non-empty path in `directories`.
    ///
    /// Registration is best effort: a directory that does not exist or cannot
    /// be read is logged at debug level and skipped. Returns how many
    /// directories are now being watched.
    pub fn start_watch<I, P>(&mut self, directories: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for dir in directories {
            let dir = dir.as_ref();
            if dir.as_os_str().is_empty() {
                continue;
            }
            if let Err(err) = self.add_watch(dir) {
                debug!("Not watching {}: {}", dir.display(), err);
            }
        }
        self.watched().len()
    }

    /// Register one more directory. See [`WatchHandle::add_watch`].
    pub fn add_watch(&mut self, path: &Path) -> Result<bool> {
        self.handle.add_watch(path)
    }

    /// Stop watching `path`. Returns `false` if it was not watched.
    pub fn unwatch(&mut self, path: &Path) -> bool {
        self.handle.unwatch(path)
    }

    /// Whether `path` is currently registered.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.handle.is_watched(path)
    }

    /// Currently registered directories, sorted.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.handle.watched()
    }

    /// Every directory the watcher has seen, registered or not.
    pub fn targets(&self) -> Vec<WatchTarget> {
        self.handle.targets()
    }

    /// Handle that stays usable after [`ChangeWatcher::run`] takes ownership.
    pub fn handle(&self) -> WatchHandle {
        self.handle.clone()
    }

    /// Sender feeding the event loop, for synthetic events.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<ChangeEvent> {
        self.event_tx.clone()
    }

    /// Sender feeding the error side of the event loop.
    pub fn error_sender(&self) -> mpsc::UnboundedSender<notify::Error> {
        self.error_tx.clone()
    }

    /// Process events until `shutdown` flips to `true` (or its sender is gone).
    ///
    /// Pending watcher errors are reported before the next change event.
    ///
    /// Each event is dispatched to completion before the next is received, so
    /// a slow rebuild delays the events queued behind it.
    pub async fn run(mut self, dispatcher: &Dispatcher, mut shutdown: watch::Receiver<bool>) -> RunStats {
        let mut stats = RunStats::default();

        if *shutdown.borrow() {
            return stats;
        }

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Watcher stopping");
                        break;
                    }
                }

                Some(err) = self.errors.recv() => {
                    stats.errors += 1;
                    ui::error(&format!("Watcher error: {}", err));
                }

                Some(event) = self.events.recv() => {
                    match self.handle_event(event, dispatcher).await {
                        Some(action) => stats.record(action),
                        None => stats.skipped += 1,
                    }
                }
            }
        }

        stats
    }

    async fn handle_event(&mut self, event: ChangeEvent, dispatcher: &Dispatcher) -> Option<BuildAction> {
        debug!("{:?} {}", event.kind, event.path.display());

        if self.is_bounce(&event.path) {
            debug!("Coalesced repeated event for {}", event.path.display());
            return None;
        }

        match event.kind {
            ChangeKind::Create if event.path.is_dir() => self.register_new_tree(&event.path),
            ChangeKind::Remove => {
                self.unwatch(&event.path);
            }
            _ => {}
        }

        Some(dispatcher.dispatch(&event).await)
    }

    /// Register a freshly created directory and any directories inside it.
    fn register_new_tree(&mut self, root: &Path) {
        let mut dirs = Vec::new();
        collect_dirs(root, &mut dirs);
        for dir in dirs {
            match self.add_watch(&dir) {
                Ok(true) => ui::info(&format!("Now watching {}", dir.display())),
                Ok(false) => {}
                Err(err) => debug!("Not watching {}: {}", dir.display(), err),
            }
        }
    }

    fn is_bounce(&mut self, path: &Path) -> bool {
        if self.debounce.is_zero() {
            return false;
        }

        let now = Instant::now();
        if let Some((last_path, last_time)) = &self.last_event {
            if last_path == path && now.duration_since(*last_time) < self.debounce {
                return true;
            }
        }
        self.last_event = Some((path.to_path_buf(), now));
        false
    }
}

/// Create the watcher for a preview run and register the site directories.
///
/// Returns `None` when watching is disabled. A creation failure is printed and
/// also yields `None`: the caller keeps serving without watching.
pub fn start_watcher<F>(config: &ServerConfig, directories: &[PathBuf], create: F) -> Option<ChangeWatcher>
where
    F: FnOnce(u64) -> Result<ChangeWatcher>,
{
    if !config.watch {
        return None;
    }

    ui::info(&format!("Watching for changes in {}", config.content_dir.display()));

    let mut watcher = match create(config.debounce_ms) {
        Ok(watcher) => watcher,
        Err(err) => {
            ui::error(&err.to_string());
            return None;
        }
    };

    let count = watcher.start_watch(directories);
    if count == 0 {
        ui::warning("No site directories to watch yet");
    }
    debug!("Registered {} of {} directories", count, directories.len());
    Some(watcher)
}
