//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation
//! and dispatching between the static file handler and the estimate endpoint.

use crate::config::Config;
use crate::handler::{estimate, static_files};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

const CALCULATE_PATH: &str = "/calculate";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    config: Arc<Config>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if config.logging.access_log {
        logger::log_request(&method, req.uri(), req.version());
    }

    if let Some(resp) = check_body_size(&req, config.http.max_body_size) {
        return Ok(resp);
    }

    let response = if path == CALCULATE_PATH {
        if method == Method::POST {
            estimate::handle(req).await
        } else {
            logger::log_warning(&format!("Method not allowed on {CALCULATE_PATH}: {method}"));
            http::build_405_response("POST")
        }
    } else if method == Method::GET || method == Method::HEAD {
        static_files::serve(
            &config.resources.web_root,
            &path,
            method == Method::HEAD,
            config.logging.access_log,
        )
        .await
    } else {
        logger::log_warning(&format!("Method not allowed: {method}"));
        http::build_405_response("GET, HEAD")
    };

    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, LoggingConfig, ResourcesConfig, ServerConfig};
    use http_body_util::BodyExt;

    fn test_config(web_root: &str) -> Arc<Config> {
        Arc::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig { access_log: false },
            resources: ResourcesConfig {
                web_root: web_root.to_string(),
            },
            http: HttpConfig {
                max_body_size: 65_536,
                request_timeout: 30,
            },
        })
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("test request must build")
    }

    #[tokio::test]
    async fn test_get_on_calculate_is_405() {
        let resp = handle_request(request(Method::GET, "/calculate", ""), test_config("web"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers().get("Allow").unwrap(), "POST");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_post_on_calculate_returns_estimate() {
        let resp = handle_request(
            request(
                Method::POST,
                "/calculate",
                r#"{"days":2,"travelers":2,"rooms":1,"cuisineCost":10,"hotelCost":50,"travelCost":20,"destinations":"100,200"}"#,
            ),
            test_config("web"),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), 200);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 903);
    }

    #[tokio::test]
    async fn test_post_on_static_path_is_405() {
        let resp = handle_request(request(Method::POST, "/index.html", ""), test_config("web"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers().get("Allow").unwrap(), "GET, HEAD");
    }

    #[tokio::test]
    async fn test_get_missing_asset_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = handle_request(
            request(Method::GET, "/missing.html", ""),
            test_config(dir.path().to_str().unwrap()),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let mut req = request(Method::POST, "/calculate", "{}");
        req.headers_mut()
            .insert("content-length", "1000000".parse().unwrap());
        let resp = handle_request(req, test_config("web")).await.unwrap();
        assert_eq!(resp.status(), 413);
    }
}
