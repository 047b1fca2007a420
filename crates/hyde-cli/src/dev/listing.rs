//! Directory listings for directories without an `index.html`.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Body returned for any path that does not exist.
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Respond to a request `ServeDir` could not satisfy.
///
/// Existing directories get a listing; everything else is a 404.
pub async fn directory_listing(root: &Path, request_path: &str) -> Response {
    let Some(dir) = resolve_request_path(root, request_path) else {
        return not_found();
    };

    match tokio::fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return not_found(),
    }

    match read_entries(&dir).await {
        Ok(entries) => Html(render_listing(request_path, &entries)).into_response(),
        Err(err) => {
            debug!("Cannot list {}: {}", dir.display(), err);
            not_found()
        }
    }
}

/// Map a URL path onto the filesystem below `root`.
///
/// Returns `None` for undecodable paths and for any `..` segment.
pub fn resolve_request_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

/// Names in `dir`, sorted, with a trailing `/` on directories.
async fn read_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        entries.push(name);
    }

    entries.sort();
    Ok(entries)
}

/// Render a listing page. `entries` are displayed and linked as given.
pub fn render_listing(request_path: &str, entries: &[String]) -> String {
    let title = escape_html(request_path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Index of {title}</title></head>\n<body>\n<h1>Index of {title}</h1>\n<pre>\n"
    );

    for name in entries {
        let href: String = name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        html.push_str(&format!("<a href=\"{}\">{}</a>\n", href, escape_html(name)));
    }

    html.push_str("</pre>\n</body>\n</html>\n");
    html
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        NOT_FOUND_BODY,
    )
        .into_response()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
