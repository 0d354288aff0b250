//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic:
//! MIME detection, query string parsing, request body reading and response builders.

pub mod body;
pub mod mime;
pub mod query;
pub mod response;

use http_body_util::combinators::UnsyncBoxBody;
use hyper::body::Bytes;

/// Body type of every response: either a buffered payload or a streamed file
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

// Re-export commonly used types
pub use body::{check_content_length, read_json};
pub use query::{decode_path, parse_query, QueryParams};
pub use response::{
    build_404_response, build_500_response, build_html_response, build_json_response,
    build_text_response, full,
};
