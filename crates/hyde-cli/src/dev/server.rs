//! Static file server for the publish directory.
//!
//! `ServeDir` handles files, `index.html` resolution and the trailing-slash
//! redirect for directories. Whatever it cannot find falls through to
//! [`directory_listing`], which lists real directories and 404s the rest.

use crate::dev::listing::directory_listing;
use crate::dev::state::wait_for_shutdown;
use crate::dev::{PublishGuard, ServerConfig};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use axum::{
    body::Body,
    extract::{Request, State},
    handler::HandlerWithoutStateExt,
    http::{StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// HTTP server for the rendered site.
pub struct FileServer {
    config: ServerConfig,
    guard: PublishGuard,
}

impl FileServer {
    pub fn new(config: ServerConfig, guard: PublishGuard) -> Self {
        Self { config, guard }
    }

    /// Bind the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Server`] if the port is taken or not permitted.
    /// Callers treat this as fatal.
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
    }

    /// Serve on an already-bound listener until `shutdown` fires.
    pub async fn serve(self, listener: TcpListener, shutdown: watch::Receiver<bool>) -> Result<()> {
        let port = listener
            .local_addr()
            .context("Listener has no local address")?
            .port();
        debug!("Serving pages from {}", self.config.publish_dir.display());

        ui::success(&format!("Web server is available at http://localhost:{}", port));
        ui::info("Press Ctrl+C to stop");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }

    /// Router serving the publish directory.
    pub fn router(&self) -> Router {
        let root = self.config.publish_dir.clone();
        let listing = {
            let root = root.clone();
            move |uri: Uri| async move { directory_listing(&root, uri.path()).await }
        };

        let serve_dir = ServeDir::new(&root)
            .append_index_html_on_directories(true)
            .fallback(listing.into_service());

        Router::new()
            .fallback_service(serve_dir)
            .layer(middleware::from_fn_with_state(self.guard.clone(), hold_read_lease))
            .layer(TraceLayer::new_for_http())
    }
}

/// Keep rebuilds out while a response is produced.
///
/// `ServeDir` streams file bodies after returning the head, so the body is
/// read in full under the lease. A rebuild that starts afterwards cannot
/// change what the client receives.
async fn hold_read_lease(State(guard): State<PublishGuard>, request: Request, next: Next) -> Response {
    let lease = guard.read().await;
    let (parts, body) = next.run(request).await.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("Failed to read response body: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    drop(lease);

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn server_for(root: &std::path::Path) -> FileServer {
        let site = SiteConfig {
            source: root.to_path_buf(),
            ..SiteConfig::default()
        };
        FileServer::new(ServerConfig::resolve(&site, 0, false), PublishGuard::new())
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public/css")).unwrap();
        fs::write(temp.path().join("public/css/site.css"), "body{}").unwrap();

        let (status, body) = get(server_for(temp.path()).router(), "/css/site.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public")).unwrap();

        let (status, body) = get(server_for(temp.path()).router(), "/nope.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 page not found");
    }

    #[tokio::test]
    async fn test_directory_index_resolution() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public/posts")).unwrap();
        fs::write(temp.path().join("public/index.html"), "<h1>home</h1>").unwrap();
        fs::write(temp.path().join("public/posts/index.html"), "<h1>posts</h1>").unwrap();

        let router = server_for(temp.path()).router();
        let (status, body) = get(router.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>home</h1>");

        let (status, body) = get(router, "/posts/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>posts</h1>");
    }

    #[tokio::test]
    async fn test_directory_without_index_is_listed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public/files/sub")).unwrap();
        fs::write(temp.path().join("public/files/b.txt"), "b").unwrap();
        fs::write(temp.path().join("public/files/a.txt"), "a").unwrap();

        let (status, body) = get(server_for(temp.path()).router(), "/files/").await;
        assert_eq!(status, StatusCode::OK);
        let a = body.find("a.txt").unwrap();
        let b = body.find("b.txt").unwrap();
        assert!(a < b);
        assert!(body.contains("<a href=\"sub/\">sub/</a>"));
    }

    #[tokio::test]
    async fn test_directory_without_trailing_slash_redirects() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public/posts")).unwrap();

        let (status, _) = get(server_for(temp.path()).router(), "/posts").await;
        assert!(status.is_redirection());
    }

    #[tokio::test]
    async fn test_bind_failure_is_server_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let err = FileServer::bind(addr).await.unwrap_err();
        assert!(matches!(err, CliError::Server(_)));
        assert!(err.to_string().contains(&addr.to_string()));
    }

    #[tokio::test]
    async fn test_request_waits_for_rebuild() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public")).unwrap();
        fs::write(temp.path().join("public/index.html"), "old").unwrap();

        let server = server_for(temp.path());
        let guard = server.guard.clone();
        let router = server.router();

        let rebuild = guard.write().await;
        let request = tokio::spawn(get(router, "/index.html"));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!request.is_finished());
        fs::write(temp.path().join("public/index.html"), "new").unwrap();
        drop(rebuild);

        let (status, body) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "new");
    }

    #[tokio::test]
    async fn test_body_unaffected_by_rebuild_after_head() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("public")).unwrap();
        let page = "A".repeat(1024 * 1024);
        fs::write(temp.path().join("public/index.html"), &page).unwrap();

        let server = server_for(temp.path());
        let guard = server.guard.clone();
        let response = server
            .router()
            .oneshot(axum::http::Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let rebuild = tokio::time::timeout(std::time::Duration::from_secs(5), guard.write())
            .await
            .unwrap();
        fs::write(temp.path().join("public/index.html"), "BBBBBBBBBB").unwrap();
        drop(rebuild);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), page.len());
        assert!(bytes.iter().all(|b| *b == b'A'));
    }
}
