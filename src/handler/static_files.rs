//! Static file serving module
//!
//! Maps request paths to files under the configured web root and builds the
//! file responses, including MIME type detection.

use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a static file from the web root
pub async fn serve(
    web_root: &str,
    path: &str,
    is_head: bool,
    access_log: bool,
) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_path(web_root, path) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return http::build_404_response();
    };

    match fs::read(&file_path).await {
        Ok(content) => {
            let content_type =
                mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
            if access_log {
                logger::log_response(200, content.len());
            }
            http::build_file_response(Bytes::from(content), content_type, is_head)
        }
        // Missing files are common; they get a plain 404 without logging
        Err(e) if e.kind() == io::ErrorKind::NotFound => http::build_404_response(),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            http::build_500_response()
        }
    }
}

/// Map a request path to a file under the web root.
///
/// The root path serves `index.html`. Paths containing `..` components
/// resolve to `None`.
fn resolve_path(web_root: &str, path: &str) -> Option<PathBuf> {
    let path = if path == "/" { "/index.html" } else { path };
    let relative = path.trim_start_matches('/');

    if relative.split('/').any(|part| part == "..") {
        return None;
    }

    Some(Path::new(web_root).join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs as std_fs;

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body()
            .collect()
            .await
            .expect("body collection is infallible")
            .to_bytes()
    }

    fn web_root_with_index() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std_fs::write(dir.path().join("index.html"), "<html>planner</html>").expect("write");
        dir
    }

    #[test]
    fn test_resolve_root_to_index() {
        assert_eq!(
            resolve_path("web", "/"),
            Some(PathBuf::from("web/index.html"))
        );
        assert_eq!(
            resolve_path("web", "/script.js"),
            Some(PathBuf::from("web/script.js"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        assert_eq!(resolve_path("web", "/../Cargo.toml"), None);
        assert_eq!(resolve_path("web", "/a/../../b"), None);
    }

    #[tokio::test]
    async fn test_root_serves_index_html() {
        let dir = web_root_with_index();
        let root = dir.path().to_str().unwrap();

        let from_root = serve(root, "/", false, false).await;
        assert_eq!(from_root.status(), 200);
        assert_eq!(
            from_root.headers().get("Content-Type").unwrap(),
            "text/html; charset=utf-8"
        );

        let by_name = serve(root, "/index.html", false, false).await;
        assert_eq!(
            body_bytes(from_root).await,
            body_bytes(by_name).await,
            "/ and /index.html must serve the same body"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_empty_body() {
        let dir = web_root_with_index();
        let resp = serve(dir.path().to_str().unwrap(), "/missing.html", false, false).await;
        assert_eq!(resp.status(), 404);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back_to_plain_text() {
        let dir = web_root_with_index();
        std_fs::write(dir.path().join("notes.dat"), "data").unwrap();
        let resp = serve(dir.path().to_str().unwrap(), "/notes.dat", false, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers().get("Content-Type").unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_head_returns_headers_without_body() {
        let dir = web_root_with_index();
        let resp = serve(dir.path().to_str().unwrap(), "/index.html", true, false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Length").unwrap(),
            &"<html>planner</html>".len().to_string()
        );
        assert!(body_bytes(resp).await.is_empty());
    }
}
