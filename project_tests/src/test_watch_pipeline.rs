//! # Watch Pipeline End-to-End Test
//!
//! Runs the supervisor, dispatcher, parse client and history cache against a
//! local mock node (WebSocket) and a local mock parsing API (HTTP).
//!
//! The mock node confirms every subscription and pushes three notifications
//! per connection. Its first connection then goes silent so the heartbeat has
//! to detect it; the replacement connection stays healthy.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use lib_watch::{
    CacheConfig, ConnectionError, Dispatcher, FetchConfig, HistoryService, ParseApi, ResultCache,
    SessionEvent, StreamConfig, Supervisor,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_util::sync::CancellationToken;

const ADDRESSES: [&str; 2] = ["AddrA", "AddrB"];
const NOTIFICATIONS_PER_CONNECTION: usize = 3;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Ping interval in milliseconds
    #[clap(long, default_value_t = 200)]
    heartbeat_ms: u64,
    /// Pong deadline in milliseconds
    #[clap(long, default_value_t = 300)]
    pong_timeout_ms: u64,
    /// Reconnect delay in milliseconds
    #[clap(long, default_value_t = 200)]
    reconnect_ms: u64,
}

async fn parse_handler(Json(body): Json<Value>) -> Json<Value> {
    let parsed = body["transactions"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|sig| {
            let desc = format!("mock transfer {}", sig.as_str().unwrap_or_default());
            json!({ "signature": sig, "type": "TRANSFER", "description": desc })
        })
        .collect();
    Json(Value::Array(parsed))
}

async fn history_handler(
    State(hits): State<Arc<AtomicUsize>>,
    Path(address): Path<String>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        { "signature": format!("{address}-old-1") },
        { "signature": format!("{address}-old-2") }
    ]))
}

async fn start_parse_api(hits: Arc<AtomicUsize>) -> Result<String> {
    let router = Router::new()
        .route("/v0/transactions/", post(parse_handler))
        .route("/v0/addresses/{address}/transactions/", get(history_handler))
        .with_state(hits);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}/"))
}

fn notification(subscription: u64, signature: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "logsNotification",
        "params": {
            "subscription": subscription,
            "result": {
                "context": { "slot": 1 },
                "value": { "signature": signature, "err": null, "logs": [] }
            }
        }
    })
    .to_string()
}

async fn start_mock_node() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut accepted = 0usize;
        while let Ok((stream, _)) = listener.accept().await {
            accepted += 1;
            let conn = accepted;
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else { return };

                // Confirm each subscribe request.
                let mut confirmed = 0;
                while confirmed < ADDRESSES.len() {
                    match ws.next().await {
                        Some(Ok(Message::Text(text))) => {
                            let req: Value =
                                serde_json::from_str(text.as_str()).unwrap_or_default();
                            let reply = json!({
                                "jsonrpc": "2.0",
                                "result": 1000 + confirmed,
                                "id": req["id"]
                            });
                            if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                                return;
                            }
                            confirmed += 1;
                        }
                        Some(Ok(_)) => continue,
                        _ => return,
                    }
                }

                for n in 0..NOTIFICATIONS_PER_CONNECTION {
                    let frame = notification(1000, &format!("sig-{conn}-{n}"));
                    if ws.send(Message::Text(frame.into())).await.is_err() {
                        return;
                    }
                }

                if conn == 1 {
                    // Stop reading: pings go unanswered.
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    return;
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });
    Ok(format!("ws://{addr}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let history_hits = Arc::new(AtomicUsize::new(0));
    let api_url = start_parse_api(Arc::clone(&history_hits)).await?;
    let ws_url = start_mock_node().await?;
    println!("[*] Mock parse API at {api_url}, mock node at {ws_url}");

    let source = Arc::new(ParseApi::new(&FetchConfig {
        base_url: api_url,
        api_key: Some("e2e".to_string()),
        ..FetchConfig::default()
    })?);
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&source), outcome_tx));

    let supervisor = Arc::new(Supervisor::new(
        StreamConfig {
            ws_url,
            tracked_addresses: ADDRESSES.iter().map(|a| a.to_string()).collect(),
            commitment: "confirmed".to_string(),
            heartbeat_interval: Duration::from_millis(args.heartbeat_ms),
            pong_timeout: Duration::from_millis(args.pong_timeout_ms),
            reconnect_delay: Duration::from_millis(args.reconnect_ms),
            connect_timeout: Duration::from_secs(5),
        },
        dispatcher,
    ));

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut event_rx = supervisor.events();
    let recorder = tokio::spawn({
        let events = Arc::clone(&events);
        async move {
            while let Ok(event) = event_rx.recv().await {
                println!("[EVENT] {event:?}");
                events.lock().unwrap().push(event);
            }
        }
    });

    let shutdown = CancellationToken::new();
    let running = tokio::spawn({
        let supervisor = Arc::clone(&supervisor);
        let shutdown = shutdown.clone();
        async move { supervisor.run(shutdown).await }
    });

    // --- Dispatch outcomes from both connections ---
    let mut failures = Vec::new();
    let mut generations = BTreeSet::new();
    let mut parsed = 0;
    let expected = NOTIFICATIONS_PER_CONNECTION * 2;
    while parsed < expected {
        match tokio::time::timeout(Duration::from_secs(10), outcome_rx.recv()).await {
            Ok(Some(outcome)) => {
                generations.insert(outcome.generation);
                match outcome.result {
                    Ok(value) => println!(
                        "[OK] gen {} {} -> {}",
                        outcome.generation, outcome.signature, value
                    ),
                    Err(e) => failures.push(format!("{} failed: {}", outcome.signature, e)),
                }
                parsed += 1;
            }
            _ => {
                failures.push(format!("only {parsed} of {expected} outcomes arrived"));
                break;
            }
        }
    }
    if generations != BTreeSet::from([1, 2]) {
        failures.push(format!("outcomes came from generations {generations:?}, expected 1 and 2"));
    }

    // --- History through the cache ---
    let cache = Arc::new(ResultCache::new(CacheConfig::default()));
    let history = HistoryService::new(Arc::clone(&source), cache);
    let addresses: Vec<String> = ADDRESSES.iter().map(|a| a.to_string()).collect();
    for round in 0..2 {
        for (address, result) in history.recent_for_all(&addresses).await {
            match result {
                Ok(value) => println!("[OK] history round {round} {address}: {value}"),
                Err(e) => failures.push(format!("history for {address} failed: {e}")),
            }
        }
    }
    let hits = history_hits.load(Ordering::SeqCst);
    if hits != ADDRESSES.len() {
        failures.push(format!("history endpoint hit {hits} times, expected {}", ADDRESSES.len()));
    }

    shutdown.cancel();
    running.await?;
    drop(supervisor);
    let _ = recorder.await;

    // --- Lifecycle ---
    let seen = events.lock().unwrap().clone();
    let heartbeat_close = seen.iter().any(|e| {
        matches!(
            e,
            SessionEvent::Closed { generation: 1, reason: ConnectionError::HeartbeatTimeout(_) }
        )
    });
    if !heartbeat_close {
        failures.push("first connection was not closed by the heartbeat".to_string());
    }
    let resubscribed = seen.contains(&SessionEvent::Subscribed {
        generation: 2,
        requests: ADDRESSES.len(),
    });
    if !resubscribed {
        failures.push("second connection did not resubscribe every address".to_string());
    }

    println!("-----------------------------------------------");
    if failures.is_empty() {
        println!("[SUCCESS] {parsed} dispatches parsed, reconnect and cache behaved as expected");
        Ok(())
    } else {
        for f in &failures {
            println!("[FAIL] {f}");
        }
        bail!("{} check(s) failed", failures.len())
    }
}
