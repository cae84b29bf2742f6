//! Shared fixtures for unit tests: local HTTP and WebSocket peers and a
//! scriptable in-memory `TransactionSource`.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::configs::watch_config::StreamConfig;
use crate::retrieve::ky_http::FetchError;
use crate::retrieve::parse_api::TransactionSource;

/// Serves `router` on an ephemeral port and returns its base URL (with trailing slash).
pub(crate) async fn spawn_http(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}/")
}

/// Accepts WebSocket connections on an ephemeral port and hands each one to
/// `handler` together with its 1-based connection number.
pub(crate) async fn spawn_ws<F, Fut>(handler: F) -> String
where
    F: Fn(usize, WebSocketStream<TcpStream>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    tokio::spawn(async move {
        let mut accepted = 0;
        while let Ok((stream, _)) = listener.accept().await {
            accepted += 1;
            let handler = Arc::clone(&handler);
            let number = accepted;
            tokio::spawn(async move {
                if let Ok(ws) = accept_async(stream).await {
                    handler(number, ws).await;
                }
            });
        }
    });
    format!("ws://{addr}")
}

/// Accepts TCP connections but never answers the WebSocket handshake.
pub(crate) async fn spawn_stalled_tcp() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("ws://{addr}")
}

/// Stream settings with short timings suitable for tests.
pub(crate) fn fast_stream_config(ws_url: String, addresses: &[&str]) -> StreamConfig {
    StreamConfig {
        ws_url,
        tracked_addresses: addresses.iter().map(|a| a.to_string()).collect(),
        commitment: "confirmed".to_string(),
        heartbeat_interval: Duration::from_secs(60),
        pong_timeout: Duration::from_secs(5),
        reconnect_delay: Duration::from_millis(100),
        connect_timeout: Duration::from_secs(5),
    }
}

/// Builds the notification frame a node sends for `signature`.
pub(crate) fn notification(subscription: u64, signature: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "logsNotification",
        "params": {
            "subscription": subscription,
            "result": {
                "context": { "slot": 5208469 },
                "value": { "signature": signature, "err": null, "logs": [] }
            }
        }
    })
    .to_string()
}

/// In-memory source that records calls and can be told to fail or hang.
#[derive(Default)]
pub(crate) struct MockSource {
    pub parse_calls: Mutex<Vec<Vec<String>>>,
    pub history_calls: AtomicUsize,
    pub failing: HashSet<String>,
    pub hanging: HashSet<String>,
}

impl MockSource {
    pub(crate) fn failing_on(signatures: &[&str]) -> Self {
        Self {
            failing: signatures.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn hanging_on(signatures: &[&str]) -> Self {
        Self {
            hanging: signatures.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn parsed(&self) -> Vec<Vec<String>> {
        self.parse_calls.lock().unwrap().clone()
    }
}

impl TransactionSource for MockSource {
    async fn parse_transactions(&self, signatures: &[String]) -> Result<Value, FetchError> {
        self.parse_calls.lock().unwrap().push(signatures.to_vec());
        if signatures.iter().any(|s| self.hanging.contains(s)) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if signatures.iter().any(|s| self.failing.contains(s)) {
            return Err(FetchError::Upstream {
                status: 500,
                body: "parse failed".to_string(),
            });
        }
        Ok(Value::Array(
            signatures.iter().map(|s| json!({ "signature": s })).collect(),
        ))
    }

    async fn address_history(&self, address: &str) -> Result<Value, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(address) {
            return Err(FetchError::Upstream {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(json!([{ "address": address }]))
    }
}
