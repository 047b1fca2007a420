//! Preview server module.
//!
//! - File server for the publish directory
//! - Change watcher with static-sync / rebuild dispatch
//! - Shared shutdown signal and publish guard

pub mod config;
pub mod dispatch;
pub mod listing;
pub mod pipeline;
pub mod server;
pub mod state;
pub mod watcher;

// Re-exports
pub use config::ServerConfig;
pub use dispatch::{classify, BuildAction, Dispatcher};
pub use pipeline::{BuildPipeline, SitePipeline};
pub use server::FileServer;
pub use state::{PublishGuard, Shutdown};
pub use watcher::{start_watcher, ChangeEvent, ChangeKind, ChangeWatcher, RunStats, WatchHandle, WatchTarget};
