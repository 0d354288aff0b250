//! Fixed pages module
//!
//! Home page, plain text and JSON samples, and the echo endpoint.

use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::http::{self, QueryParams, ResponseBody};

/// Echo input used when `input` is missing or empty
pub const DEFAULT_ECHO_INPUT: &str = "Hello";

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Storefront</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <h1>Storefront</h1>
    <p>A small HTTP server with routing, static files and a products API.</p>
    <ul>
        <li><a href="/plain-text">Plain text</a></li>
        <li><a href="/json">JSON</a></li>
        <li><a href="/echo?input=Hello%20there">Echo</a></li>
        <li><a href="/static/style.css">Static file</a></li>
        <li><a href="/products">Products</a></li>
        <li><a href="/products/1001">Product 1001</a></li>
    </ul>
</body>
</html>"#;

/// Derived views of the echo input
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Echo {
    pub normal: String,
    pub shouty: String,
    /// Number of characters (Unicode scalar values), not bytes
    pub character_count: usize,
    pub backwards: String,
}

impl Echo {
    pub fn new(input: &str) -> Self {
        Self {
            normal: input.to_string(),
            shouty: input.to_uppercase(),
            character_count: input.chars().count(),
            backwards: input.chars().rev().collect(),
        }
    }
}

pub fn home() -> Response<ResponseBody> {
    http::build_html_response(StatusCode::OK, HOME_PAGE)
}

pub fn plain_text() -> Response<ResponseBody> {
    http::build_text_response(StatusCode::OK, "Hello from the plain text route!")
}

pub fn json_sample() -> Response<ResponseBody> {
    http::build_json_response(
        StatusCode::OK,
        &json!({
            "message": "Hello from the JSON route!",
            "server": "storefront",
        }),
    )
}

pub fn echo(query: &QueryParams) -> Response<ResponseBody> {
    let input = query
        .get("input")
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ECHO_INPUT);
    http::build_json_response(StatusCode::OK, &Echo::new(input))
}
