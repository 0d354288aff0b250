//! Request body reading module
//!
//! Buffers a whole request body under a size cap and decodes it as JSON.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::logger;

/// Reject early when the declared `Content-Length` exceeds `max_body_size`
///
/// A missing or unparsable header is not an error here; the cap is still
/// enforced while reading.
pub fn check_content_length(headers: &HeaderMap, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = headers.get("content-length") else {
        return Ok(());
    };
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge(max_body_size))
        }
        Ok(_) => Ok(()),
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
    }
}

/// Read the full body (at most `max_body_size` bytes) and decode it as JSON
///
/// Only a JSON object is accepted at the top level.
pub async fn read_json<T, B>(body: B, max_body_size: u64) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let whole_body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(ApiError::PayloadTooLarge(max_body_size));
        }
        Err(e) => {
            return Err(ApiError::InvalidBody(format!(
                "failed to read request body: {e}"
            )));
        }
    };

    let value: serde_json::Value =
        serde_json::from_slice(&whole_body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::InvalidBody(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[tokio::test]
    async fn test_read_valid_json() {
        let body = Full::new(Bytes::from(r#"{"id":5}"#));
        let item: Item = read_json(body, 1024).await.unwrap();
        assert_eq!(item, Item { id: 5 });
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let body = Full::new(Bytes::from("{not json"));
        let result: Result<Item, _> = read_json(body, 1024).await;
        assert!(matches!(result, Err(ApiError::InvalidBody(_))));
    }

    #[tokio::test]
    async fn test_non_object_rejected() {
        for raw in ["[5]", "[]", "5", "null", r#""id""#] {
            let result: Result<Item, _> = read_json(Full::new(Bytes::from(raw)), 1024).await;
            assert!(matches!(result, Err(ApiError::InvalidBody(_))), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let body = Full::new(Bytes::from(vec![b' '; 64]));
        let result: Result<Item, _> = read_json(body, 16).await;
        assert!(matches!(result, Err(ApiError::PayloadTooLarge(16))));
    }

    #[test]
    fn test_content_length_check() {
        let mut headers = HeaderMap::new();
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert("content-length", "10".parse().unwrap());
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert("content-length", "11".parse().unwrap());
        assert!(matches!(
            check_content_length(&headers, 10),
            Err(ApiError::PayloadTooLarge(10))
        ));

        headers.insert("content-length", "abc".parse().unwrap());
        assert!(check_content_length(&headers, 10).is_ok());
    }
}
