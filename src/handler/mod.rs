//! Request handler module
//!
//! Responsible for request routing dispatch and the handlers behind each route:
//! fixed pages, echo, static files and the products API.

pub mod pages;
pub mod products;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, Router};
