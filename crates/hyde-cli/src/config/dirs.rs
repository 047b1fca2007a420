//! Enumeration of the directories the change watcher registers.

use crate::config::SiteConfig;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Every directory under the content, layout and static roots, roots included.
///
/// Hidden directories (and everything below them) are skipped. A root that
/// does not exist contributes nothing; the watcher tolerates that case.
pub fn get_dir_list(config: &SiteConfig) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for root in [config.content_path(), config.layout_path(), config.static_path()] {
        collect_dirs(&root, &mut dirs);
    }
    dirs.dedup();
    dirs
}

/// Append `root` and all of its non-hidden subdirectories to `out`.
pub(crate) fn collect_dirs(root: &Path, out: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => out.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => debug!("Skipping {}: {}", root.display(), err),
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
