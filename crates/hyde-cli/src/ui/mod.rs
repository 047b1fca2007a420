//! Terminal UI utilities for status output.
//!
//! User-facing messages go to stderr with a colored status glyph. Diagnostic
//! detail goes through `tracing` instead (see [`crate::logger`]).
//!
//! ```no_run
//! use hyde_cli::ui;
//!
//! ui::init_colors(false);
//! ui::info("Watching for changes in /site/content");
//! ui::success("Rebuild completed in 120ms");
//! ```

mod format;
mod messages;

pub use format::format_duration;
pub use messages::{error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection on stderr.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

static COLORS: AtomicBool = AtomicBool::new(true);

/// Initialize color support based on environment and the `--no-color` flag.
///
/// Should be called early, before any status message is printed.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Whether status messages are currently colored.
pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
