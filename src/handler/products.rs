//! Products REST handlers
//!
//! Collection and item routes over the injected [`ProductStore`].

use hyper::body::Body;
use hyper::{HeaderMap, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;
use crate::http::{self, ResponseBody};
use crate::store::{Product, ProductPatch, ProductStore};

#[derive(Debug, Serialize)]
struct ProductListResponse {
    status: &'static str,
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct ProductResponse {
    status: &'static str,
    product: Product,
}

fn ok_status() -> Response<ResponseBody> {
    http::build_json_response(StatusCode::OK, &json!({ "status": "OK" }))
}

/// `GET /products`
pub fn list(store: &ProductStore) -> Response<ResponseBody> {
    http::build_json_response(
        StatusCode::OK,
        &ProductListResponse {
            status: "OK",
            products: store.all(),
        },
    )
}

/// `POST /products`
pub async fn create<B>(
    store: &ProductStore,
    headers: &HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    http::check_content_length(headers, max_body_size)?;
    let product: Product = http::read_json(body, max_body_size).await?;
    store.add(product);

    Ok(http::build_json_response(
        StatusCode::CREATED,
        &json!({ "status": "Created", "message": "Product added" }),
    ))
}

/// `GET /products/{id}`
pub fn get(store: &ProductStore, id: i64) -> Result<Response<ResponseBody>, ApiError> {
    let product = store.get_by_id(id).ok_or(ApiError::ProductNotFound(id))?;
    Ok(http::build_json_response(
        StatusCode::OK,
        &ProductResponse {
            status: "OK",
            product,
        },
    ))
}

/// `PATCH /products/{id}`
///
/// The body is decoded before the lookup, so a malformed body is a 400
/// even for an unknown id.
pub async fn update<B>(
    store: &ProductStore,
    id: i64,
    headers: &HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    http::check_content_length(headers, max_body_size)?;
    let patch: ProductPatch = http::read_json(body, max_body_size).await?;

    if store.update(id, &patch) {
        Ok(ok_status())
    } else {
        Err(ApiError::ProductNotFound(id))
    }
}

/// `DELETE /products/{id}`
pub fn delete(store: &ProductStore, id: i64) -> Result<Response<ResponseBody>, ApiError> {
    if store.remove(id) {
        Ok(ok_status())
    } else {
        Err(ApiError::ProductNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;

    async fn body_json(resp: Response<ResponseBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list() {
        let store = ProductStore::seeded();
        let value = body_json(list(&store)).await;
        assert_eq!(value["status"], "OK");
        assert_eq!(value["products"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["products"][0]["id"], 1001);
    }

    #[tokio::test]
    async fn test_create_appends() {
        let store = ProductStore::new();
        let body = Full::new(Bytes::from(
            r#"{"id":2000,"title":"Hat","sku":"X-1","price":1000}"#,
        ));
        let resp = create(&store, &HeaderMap::new(), body, 1024).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["status"], "Created");
        assert_eq!(
            store.get_by_id(2000),
            Some(Product::new(2000, "Hat", "X-1", 1000))
        );
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let store = ProductStore::new();
        let body = Full::new(Bytes::from(r#"{"id":"#));
        let result = create(&store, &HeaderMap::new(), body, 1024).await;
        assert!(matches!(result, Err(ApiError::InvalidBody(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let store = ProductStore::seeded();
        let body = Full::new(Bytes::from(r#"{"price":1}"#));
        let result = update(&store, 9999, &HeaderMap::new(), body, 1024).await;
        assert!(matches!(result, Err(ApiError::ProductNotFound(9999))));
    }

    #[test]
    fn test_get_and_delete() {
        let store = ProductStore::seeded();
        assert!(get(&store, 1002).is_ok());
        assert!(delete(&store, 1002).is_ok());
        assert!(matches!(get(&store, 1002), Err(ApiError::ProductNotFound(1002))));
        assert!(matches!(delete(&store, 1002), Err(ApiError::ProductNotFound(1002))));
    }
}
