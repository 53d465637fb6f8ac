//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build 200 OK response for a static file
pub fn build_file_response(
    content: Bytes,
    content_type: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response();
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 Bad Request response with a JSON error body
pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    Response::builder()
        .status(400)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("400", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response (empty body)
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 405 Method Not Allowed response (empty body)
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Allow", allow)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(413)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("413 Payload Too Large")))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(Full::new(Bytes::from("413 Payload Too Large")))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("500 Internal Server Error")))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from("500 Internal Server Error")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
