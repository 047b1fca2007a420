use std::path::PathBuf;

pub fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

pub fn default_layout_dir() -> PathBuf {
    PathBuf::from("layouts")
}

pub fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

pub fn default_publish_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Port the preview server listens on when `--port` is not given.
pub const DEFAULT_PORT: u16 = 1313;
