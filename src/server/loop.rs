// Server loop module
// Accepts connections until a shutdown signal arrives, then drains active connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop for the application server
///
/// Must run inside a `LocalSet`, connections are served with `spawn_local`.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    // Both branches may be ready; never serve past a shutdown request
                    Ok(_) if signals.is_shutdown_requested() => break,
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.shutdown.notified() => {
                break;
            }
        }
    }

    // Stop accepting before draining
    drop(listener);

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    let remaining = drain_connections(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until no connection is active or `grace` has elapsed
///
/// Returns the number of connections still open at the end.
pub async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> usize {
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use crate::store::ProductStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let counter = AtomicUsize::new(0);
        let remaining = drain_connections(&counter, Duration::from_secs(5)).await;
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(2);
        let remaining = drain_connections(&counter, Duration::from_millis(120)).await;
        assert_eq!(remaining, 2);
    }

    #[tokio::test]
    async fn test_pending_connection_not_served_after_shutdown() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&config, Arc::new(ProductStore::seeded())));
        let signals = Arc::new(SignalHandler::new());

        // Queued in the backlog before the loop starts
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        signals.request_shutdown();

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                tokio::time::timeout(
                    Duration::from_secs(5),
                    start_server_loop(listener, state, signals),
                )
                .await
                .unwrap()
                .unwrap();
            })
            .await;

        let mut response = String::new();
        stream.read_to_string(&mut response).await.ok();
        assert!(!response.starts_with("HTTP/1.1"), "{response}");
    }

    #[tokio::test]
    async fn test_serves_requests_until_shutdown() {
        let mut config = Config::defaults().unwrap();
        config.logging.access_log = false;
        config.performance.keep_alive = false;

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&config, Arc::new(ProductStore::seeded())));
        let signals = Arc::new(SignalHandler::new());

        let local = tokio::task::LocalSet::new();
        let server_signals = Arc::clone(&signals);
        let server = local.spawn_local(async move {
            start_server_loop(listener, state, server_signals)
                .await
                .map_err(|e| e.to_string())
        });

        local
            .run_until(async move {
                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                let request = b"GET /products/1001 HTTP/1.1\r\n\
                    Host: localhost\r\nConnection: close\r\n\r\n";
                stream.write_all(request).await.unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
                assert!(response.contains("\"id\":1001"));

                signals.request_shutdown();
                server.await.unwrap().unwrap();
            })
            .await;
    }
}
