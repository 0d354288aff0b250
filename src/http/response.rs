//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from
//! specific business logic.

use super::ResponseBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

const NOT_FOUND_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>404 Not Found</title></head>
<body>
    <h1>404 Not Found</h1>
    <p>The requested page does not exist. <a href="/">Back to home</a></p>
</body>
</html>"#;

/// Wrap a fully buffered payload as a response body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Build generic HTML response
pub fn build_html_response(
    status: StatusCode,
    content: impl Into<Bytes>,
) -> Response<ResponseBody> {
    build_buffered_response(status, "text/html; charset=utf-8", content.into())
}

/// Build plain text response
pub fn build_text_response(
    status: StatusCode,
    content: impl Into<Bytes>,
) -> Response<ResponseBody> {
    build_buffered_response(status, "text/plain; charset=utf-8", content.into())
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    match serde_json::to_vec(body) {
        Ok(json) => build_buffered_response(status, "application/json", Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_buffered_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                Bytes::from_static(br#"{"status":"Internal Server Error"}"#),
            )
        }
    }
}

/// Build 404 Not Found HTML response
pub fn build_404_response() -> Response<ResponseBody> {
    build_html_response(StatusCode::NOT_FOUND, NOT_FOUND_HTML)
}

/// Build 500 Internal Server Error HTML response
pub fn build_500_response() -> Response<ResponseBody> {
    build_html_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "<!DOCTYPE html><html><body><h1>500 Internal Server Error</h1></body></html>",
    )
}

/// Build streamed file response
pub fn build_file_response(
    body: ResponseBody,
    content_type: &str,
    content_length: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("file", &e);
            Response::new(full(Bytes::new()))
        })
}

fn build_buffered_response(
    status: StatusCode,
    content_type: &str,
    content: Bytes,
) -> Response<ResponseBody> {
    let content_length = content.len();
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(full(content))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let resp =
            build_json_response(StatusCode::CREATED, &serde_json::json!({"status": "Created"}));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(body_string(resp).await, r#"{"status":"Created"}"#);
    }

    #[tokio::test]
    async fn test_404_is_html() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(body_string(resp).await.contains("404 Not Found"));
    }

    #[test]
    fn test_content_length_header() {
        let resp = build_text_response(StatusCode::OK, "hello");
        assert_eq!(resp.headers()["content-length"], "5");
    }
}
