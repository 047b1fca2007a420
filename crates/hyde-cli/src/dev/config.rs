//! Preview server configuration.
//!
//! Resolved once per run from the site configuration and the command flags,
//! then handed to each component. Nothing reads run parameters from globals.

use crate::config::SiteConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Immutable run parameters for the preview server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,

    /// Whether the change watcher runs
    pub watch: bool,

    /// Effective base URL, never empty
    pub base_url: String,

    /// Absolute site root
    pub source_dir: PathBuf,

    /// Absolute content directory
    pub content_dir: PathBuf,

    /// Absolute layout directory
    pub layout_dir: PathBuf,

    /// Absolute static-assets directory
    pub static_dir: PathBuf,

    /// Absolute publish directory
    pub publish_dir: PathBuf,

    /// Same-path event coalescing window in milliseconds, `0` disables it
    pub debounce_ms: u64,
}

impl ServerConfig {
    /// Build the run parameters from a loaded site config.
    pub fn resolve(site: &SiteConfig, port: u16, watch: bool) -> Self {
        Self {
            port,
            watch,
            base_url: Self::effective_base_url(&site.base_url, port),
            source_dir: site.source.clone(),
            content_dir: site.content_path(),
            layout_dir: site.layout_path(),
            static_dir: site.static_path(),
            publish_dir: site.publish_path(),
            debounce_ms: site.watch_debounce_ms,
        }
    }

    /// `base_url` unless it is empty, in which case `http://localhost:<port>`.
    pub fn effective_base_url(base_url: &str, port: u16) -> String {
        if base_url.trim().is_empty() {
            format!("http://localhost:{}", port)
        } else {
            base_url.to_string()
        }
    }

    /// Socket address the file server binds (`:port`).
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// URL printed for the user.
    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            source: PathBuf::from("/site"),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_empty_base_url_derived_from_port() {
        let config = ServerConfig::resolve(&site(), 1313, false);
        assert_eq!(config.base_url, "http://localhost:1313");

        let config = ServerConfig::resolve(&site(), 8080, false);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_configured_base_url_kept() {
        let site = SiteConfig {
            base_url: "https://example.org/".to_string(),
            ..site()
        };
        let config = ServerConfig::resolve(&site, 1313, true);
        assert_eq!(config.base_url, "https://example.org/");
    }

    #[test]
    fn test_whitespace_base_url_counts_as_empty() {
        assert_eq!(
            ServerConfig::effective_base_url("  ", 4000),
            "http://localhost:4000"
        );
    }

    #[test]
    fn test_paths_resolved_against_source() {
        let config = ServerConfig::resolve(&site(), 1313, true);
        assert_eq!(config.content_dir, PathBuf::from("/site/content"));
        assert_eq!(config.layout_dir, PathBuf::from("/site/layouts"));
        assert_eq!(config.static_dir, PathBuf::from("/site/static"));
        assert_eq!(config.publish_dir, PathBuf::from("/site/public"));
        assert!(config.watch);
    }

    #[test]
    fn test_addr_binds_all_interfaces() {
        let config = ServerConfig::resolve(&site(), 1313, false);
        assert_eq!(config.addr().to_string(), "0.0.0.0:1313");
        assert_eq!(config.server_url(), "http://localhost:1313");
    }
}
