//! Storefront: a small HTTP server with fixed pages, an echo endpoint,
//! static file streaming and an in-memory products REST API.
//!
//! Built on Tokio and Hyper. The binary in `main.rs` wires these modules
//! together; they are exposed here so they can be exercised on their own.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
