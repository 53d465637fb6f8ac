//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Get MIME Content-Type based on file extension
///
/// Unknown or missing extensions fall back to `text/plain`.
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Documents
        Some("pdf") => "application/pdf",

        // Default
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("png")), "image/png");
        assert_eq!(get_content_type(Some("svg")), "image/svg+xml");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_plain_text() {
        assert_eq!(get_content_type(Some("xyz")), "text/plain");
        assert_eq!(get_content_type(None), "text/plain");
    }
}
