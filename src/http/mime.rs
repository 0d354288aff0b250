//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

/// Get MIME Content-Type based on file extension
///
/// Extensions are compared case-insensitively; anything outside the table
/// is served as `application/octet-stream`.
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };

    match ext.to_ascii_lowercase().as_str() {
        // Text
        "html" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "txt" => "text/plain",

        // JavaScript
        "js" => "application/javascript",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",

        // Documents
        "pdf" => "application/pdf",

        // Default
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("png")), "image/png");
        assert_eq!(get_content_type(Some("jpg")), "image/jpeg");
        assert_eq!(get_content_type(Some("jpeg")), "image/jpeg");
        assert_eq!(get_content_type(Some("pdf")), "application/pdf");
        assert_eq!(get_content_type(Some("csv")), "text/csv");
        assert_eq!(get_content_type(Some("txt")), "text/plain");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(get_content_type(Some("PNG")), "image/png");
        assert_eq!(get_content_type(Some("Css")), "text/css");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("json")), "application/octet-stream");
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }
}
