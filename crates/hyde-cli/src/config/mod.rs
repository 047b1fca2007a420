//! Site configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod dirs;
mod loading;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use defaults::*;
pub use dirs::get_dir_list;
pub(crate) use dirs::collect_dirs;
pub use loading::CONFIG_FILE_NAMES;

/// Site configuration - loaded from config.{toml,yaml,json}, `HYDE_*` env
/// vars and CLI flags.
///
/// Directory fields are stored as written; use [`SiteConfig::get_abs_path`]
/// to resolve them against the site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL the site is rendered for. Empty means "derive from port".
    #[serde(default)]
    pub base_url: String,

    /// Markdown/content sources
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Templates
    #[serde(default = "default_layout_dir")]
    pub layout_dir: PathBuf,

    /// Assets copied verbatim into the publish directory
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Rendered output served over HTTP
    #[serde(default = "default_publish_dir")]
    pub publish_dir: PathBuf,

    /// External command that regenerates the publish directory,
    /// e.g. `["make", "site"]`. Empty disables rebuilds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_command: Vec<String>,

    /// Drop repeated events for the same path within this many
    /// milliseconds. `0` keeps one action per event.
    #[serde(default)]
    pub watch_debounce_ms: u64,

    /// Absolute site root. Set by the loader, never read from files.
    #[serde(skip)]
    pub source: PathBuf,
}

/// Site-wide options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    /// Site root directory
    pub source: PathBuf,
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Base URL override
    pub base_url: Option<String>,
}

impl SiteConfig {
    /// Resolve a configured directory against the site root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn get_abs_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        let dir = dir.as_ref();
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.source.join(dir)
        }
    }

    /// Absolute content directory.
    pub fn content_path(&self) -> PathBuf {
        self.get_abs_path(&self.content_dir)
    }

    /// Absolute layout directory.
    pub fn layout_path(&self) -> PathBuf {
        self.get_abs_path(&self.layout_dir)
    }

    /// Absolute static-assets directory.
    pub fn static_path(&self) -> PathBuf {
        self.get_abs_path(&self.static_dir)
    }

    /// Absolute publish directory.
    pub fn publish_path(&self) -> PathBuf {
        self.get_abs_path(&self.publish_dir)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            content_dir: default_content_dir(),
            layout_dir: default_layout_dir(),
            static_dir: default_static_dir(),
            publish_dir: default_publish_dir(),
            build_command: Vec::new(),
            watch_debounce_ms: 0,
            source: PathBuf::new(),
        }
    }
}
