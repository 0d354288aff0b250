//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: ordered route table matching,
//! dispatch to handlers, and access logging.

use futures_util::FutureExt;
use hyper::body::Body;
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::{pages, products, static_files};
use crate::config::{AppState, Config};
use crate::error::ApiError;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::store::ProductStore;

/// What a matched route does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Home,
    PlainText,
    Json,
    Echo,
    Static,
    ListProducts,
    CreateProduct,
    GetProduct,
    UpdateProduct,
    DeleteProduct,
}

/// Path shape a route accepts
#[derive(Debug, Clone, Copy)]
pub enum RoutePattern {
    /// Whole path equals the string
    Exact(&'static str),
    /// Path starts with the string; the remainder is captured
    Prefix(&'static str),
    /// `/<name>`
    Collection(&'static str),
    /// `/<name>/<id>` where `<id>` parses as an integer
    Item(&'static str),
}

/// Value captured by a matched pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteParam<'a> {
    None,
    Rest(&'a str),
    Id(i64),
}

impl RoutePattern {
    pub fn capture<'p>(&self, path: &'p str) -> Option<RouteParam<'p>> {
        match *self {
            Self::Exact(p) => (path == p).then_some(RouteParam::None),
            Self::Prefix(p) => path.strip_prefix(p).map(RouteParam::Rest),
            Self::Collection(name) => {
                let segments: Vec<&str> = path.split('/').collect();
                matches!(segments.as_slice(), ["", n] if *n == name).then_some(RouteParam::None)
            }
            Self::Item(name) => {
                let segments: Vec<&str> = path.split('/').collect();
                match segments.as_slice() {
                    ["", n, id] if *n == name => id.parse::<i64>().ok().map(RouteParam::Id),
                    _ => None,
                }
            }
        }
    }
}

/// One entry of the route table
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: RoutePattern,
    pub kind: RouteKind,
}

impl Route {
    const fn new(method: Method, pattern: RoutePattern, kind: RouteKind) -> Self {
        Self {
            method,
            pattern,
            kind,
        }
    }
}

/// Route table in priority order; the first match wins
pub fn default_routes() -> Vec<Route> {
    use RouteKind as K;
    use RoutePattern as P;

    vec![
        Route::new(Method::GET, P::Exact("/"), K::Home),
        Route::new(Method::GET, P::Exact("/home"), K::Home),
        Route::new(Method::GET, P::Exact("/plain-text"), K::PlainText),
        Route::new(Method::GET, P::Exact("/json"), K::Json),
        Route::new(Method::GET, P::Exact("/echo"), K::Echo),
        Route::new(Method::GET, P::Prefix("/static/"), K::Static),
        Route::new(Method::GET, P::Collection("products"), K::ListProducts),
        Route::new(Method::POST, P::Collection("products"), K::CreateProduct),
        Route::new(Method::GET, P::Item("products"), K::GetProduct),
        Route::new(Method::PATCH, P::Item("products"), K::UpdateProduct),
        Route::new(Method::DELETE, P::Item("products"), K::DeleteProduct),
    ]
}

/// Stateless request router over an injected product store
pub struct Router {
    routes: Vec<Route>,
    store: Arc<ProductStore>,
    public_dir: PathBuf,
    chunk_size: usize,
    max_body_size: u64,
}

impl Router {
    pub fn new(store: Arc<ProductStore>, config: &Config) -> Self {
        Self {
            routes: default_routes(),
            store,
            public_dir: PathBuf::from(&config.static_files.public_dir),
            chunk_size: config.static_files.chunk_size,
            max_body_size: config.http.max_body_size,
        }
    }

    pub const fn store(&self) -> &Arc<ProductStore> {
        &self.store
    }

    /// Find the first route matching `method` and `path`
    pub fn match_route<'p>(
        &self,
        method: &Method,
        path: &'p str,
    ) -> Option<(RouteKind, RouteParam<'p>)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.pattern.capture(path).map(|param| (route.kind, param)))
    }

    /// Dispatch a request to its handler and turn errors into responses
    pub async fn dispatch<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let Some((kind, param)) = self.match_route(&parts.method, parts.uri.path()) else {
            return ApiError::NotFound.into_response();
        };

        let result = match (kind, param) {
            (RouteKind::Home, _) => Ok(pages::home()),
            (RouteKind::PlainText, _) => Ok(pages::plain_text()),
            (RouteKind::Json, _) => Ok(pages::json_sample()),
            (RouteKind::Echo, _) => Ok(pages::echo(&http::parse_query(parts.uri.query()))),
            (RouteKind::Static, RouteParam::Rest(rest)) => {
                static_files::serve(&self.public_dir, rest, self.chunk_size).await
            }
            (RouteKind::ListProducts, _) => Ok(products::list(&self.store)),
            (RouteKind::CreateProduct, _) => {
                products::create(&self.store, &parts.headers, body, self.max_body_size).await
            }
            (RouteKind::GetProduct, RouteParam::Id(id)) => products::get(&self.store, id),
            (RouteKind::UpdateProduct, RouteParam::Id(id)) => {
                products::update(&self.store, id, &parts.headers, body, self.max_body_size).await
            }
            (RouteKind::DeleteProduct, RouteParam::Id(id)) => products::delete(&self.store, id),
            (kind, param) => Err(ApiError::Internal(format!(
                "route {kind:?} matched with unexpected parameter {param:?}"
            ))),
        };

        result.unwrap_or_else(ApiError::into_response)
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: handler errors become error responses, and a panicking
/// handler becomes a 500 instead of taking the connection task down.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    let entry = access_log.then(|| new_access_entry(&req, peer_addr));

    let mut response = match AssertUnwindSafe(state.router.dispatch(req))
        .catch_unwind()
        .await
    {
        Ok(resp) => resp,
        Err(_) => {
            logger::log_error("Request handler panicked");
            ApiError::Internal("handler panicked".to_string()).into_response()
        }
    };

    match HeaderValue::from_str(&state.config.http.server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server_name header value: {e}")),
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .or_else(|| response.body().size_hint().exact());
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn new_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
