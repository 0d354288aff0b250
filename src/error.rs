//! Error types for request handling.

use hyper::{Response, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::http::{self, ResponseBody};

/// Errors a request handler can return.
///
/// Every variant maps to a response through [`ApiError::into_response`],
/// so nothing escapes the request boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route or static file matched the request.
    #[error("page not found")]
    NotFound,

    /// No product with the requested id.
    #[error("product {0} not found")]
    ProductNotFound(i64),

    /// The request body could not be read or decoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The request body is larger than the configured limit.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(u64),

    /// A static file exists but could not be opened or inspected.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::ProductNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::FileRead { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into the response sent to the client
    ///
    /// Product routes answer in JSON, everything else in HTML.
    pub fn into_response(self) -> Response<ResponseBody> {
        let status = self.status();
        match self {
            Self::NotFound => http::build_404_response(),
            Self::ProductNotFound(_) => {
                http::build_json_response(status, &json!({ "status": "Not Found" }))
            }
            Self::InvalidBody(ref message) => http::build_json_response(
                status,
                &json!({ "status": "Bad Request", "message": message }),
            ),
            Self::PayloadTooLarge(_) => http::build_json_response(
                status,
                &json!({ "status": "Payload Too Large", "message": self.to_string() }),
            ),
            Self::FileRead { .. } | Self::Internal(_) => {
                crate::logger::log_error(&self.to_string());
                http::build_500_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::ProductNotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidBody("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge(10).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let err = ApiError::FileRead {
            path: "a".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_families() {
        let html = ApiError::NotFound.into_response();
        assert!(html.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let json = ApiError::ProductNotFound(9999).into_response();
        assert_eq!(json.headers()["content-type"], "application/json");
    }
}
