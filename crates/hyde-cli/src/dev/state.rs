//! Shared state for the preview server.
//!
//! Two pieces are shared between the watcher task and the HTTP task:
//!
//! - [`PublishGuard`]: build actions hold the write side while they touch the
//!   publish directory, HTTP responses hold the read side. A response never
//!   observes a half-written rebuild.
//! - [`Shutdown`]: a `watch` channel both tasks select on.

use std::sync::Arc;
use tokio::sync::{watch, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Serializes build actions against in-flight HTTP responses.
#[derive(Debug, Clone, Default)]
pub struct PublishGuard {
    lock: Arc<RwLock<()>>,
}

impl PublishGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease held while producing one HTTP response.
    pub async fn read(&self) -> OwnedRwLockReadGuard<()> {
        Arc::clone(&self.lock).read_owned().await
    }

    /// Lease held for the duration of one build action.
    pub async fn write(&self) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(&self.lock).write_owned().await
    }
}

/// Cooperative shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A receiver that observes [`Shutdown::trigger`].
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once shutdown is requested or the signal's owner is gone.
pub async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
