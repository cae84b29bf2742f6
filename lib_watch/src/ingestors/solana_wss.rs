//! # Solana WSS Subscription Manager
//!
//! Owns exactly one push connection. `connect` performs the handshake and
//! immediately subscribes every tracked address; `run` then services the
//! connection until it closes, and consumes the manager in doing so. A closed
//! manager is never reused: the supervisor builds a new one.
//!
//! ## Heartbeat
//!
//! ```text
//!   Open --(interval tick: send ping)--> AwaitingPong
//!   AwaitingPong --(pong)--> Open
//!   AwaitingPong --(deadline expires)--> Closed
//! ```
//!
//! Ticks that land while a ping is outstanding are ignored. The deadline can
//! fire at most once because `run` returns as soon as it does, dropping the
//! socket without a close handshake. A ping that cannot even be written
//! within the pong timeout is treated the same way.
//!
//! All state lives on the task that calls `run`; notifications are handed to
//! the `Dispatcher`, which never blocks this loop.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::configs::watch_config::StreamConfig;
use crate::core::dispatcher::Dispatcher;
use crate::ingestors::messages::{self, Inbound};
use crate::retrieve::parse_api::TransactionSource;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of one push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress.
    Connecting,
    /// Connected, no ping outstanding.
    Open,
    /// A ping was sent and its pong has not arrived yet.
    AwaitingPong,
    /// Shutting down on request.
    Closing,
    /// Terminal; the supervisor will replace this manager.
    Closed,
}

/// Why a connection ended. None of these are fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection closed by remote")]
    RemoteClosed,

    #[error("no pong within {0:?}")]
    HeartbeatTimeout(Duration),
}

/// One subscribed push connection.
pub struct SubscriptionManager<S> {
    generation: u64,
    config: Arc<StreamConfig>,
    dispatcher: Arc<Dispatcher<S>>,
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    state: ConnectionState,
    /// Request id -> address, until the node confirms the subscription.
    pending: HashMap<u64, String>,
    /// Subscription id -> address, for confirmed subscriptions.
    subscriptions: HashMap<u64, String>,
}

impl<S: TransactionSource> SubscriptionManager<S> {
    /// Opens the connection and sends one `logsSubscribe` per distinct tracked address.
    ///
    /// Request ids are `1..=n` in the order the addresses are configured;
    /// repeated addresses are subscribed only at their first position.
    pub async fn connect(
        generation: u64,
        config: Arc<StreamConfig>,
        dispatcher: Arc<Dispatcher<S>>,
    ) -> Result<Self, ConnectionError> {
        log::info!("[gen {}] Connecting to {}", generation, display_url(&config.ws_url));
        log::trace!("[gen {}] State -> {:?}", generation, ConnectionState::Connecting);

        let handshake = connect_async(config.ws_url.as_str());
        let (ws_stream, _) = match timeout(config.connect_timeout, handshake).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(ConnectionError::Connect(e.to_string())),
            Err(_) => return Err(ConnectionError::ConnectTimeout(config.connect_timeout)),
        };

        let (write, read) = ws_stream.split();
        let mut manager = Self {
            generation,
            config,
            dispatcher,
            write,
            read,
            state: ConnectionState::Connecting,
            pending: HashMap::new(),
            subscriptions: HashMap::new(),
        };
        manager.set_state(ConnectionState::Open);
        log::info!("[gen {}] WebSocket connected", generation);

        manager.subscribe_all().await?;
        Ok(manager)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of subscription requests still waiting for confirmation.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Address behind a confirmed subscription id.
    pub fn subscribed_address(&self, subscription_id: u64) -> Option<&str> {
        self.subscriptions.get(&subscription_id).map(String::as_str)
    }

    /// Services the connection until it closes.
    ///
    /// Returns `Ok(())` only when `shutdown` was cancelled; every other way out
    /// is a `ConnectionError` the caller should react to by reconnecting.
    pub async fn run(mut self, shutdown: &CancellationToken) -> Result<(), ConnectionError> {
        let result = self.drive(shutdown).await;
        self.set_state(ConnectionState::Closed);
        result
    }

    async fn subscribe_all(&mut self) -> Result<(), ConnectionError> {
        let mut seen = HashSet::new();
        let mut id = 0u64;
        for address in self.config.tracked_addresses.iter() {
            if !seen.insert(address.as_str()) {
                log::warn!("[gen {}] Ignoring repeated address {}", self.generation, address);
                continue;
            }
            id += 1;
            let request = messages::logs_subscribe(id, address, &self.config.commitment);
            log::debug!("[gen {}] Subscribing {} (id {})", self.generation, address, id);

            self.write
                .send(Message::Text(request.to_string().into()))
                .await
                .map_err(|e| ConnectionError::Transport(e.to_string()))?;
            self.pending.insert(id, address.clone());
        }
        log::info!(
            "[gen {}] Sent {} subscription request(s)",
            self.generation,
            self.pending.len()
        );
        Ok(())
    }

    async fn drive(&mut self, shutdown: &CancellationToken) -> Result<(), ConnectionError> {
        let period = self.config.heartbeat_interval;
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.set_state(ConnectionState::Closing);
                    if let Err(e) = self.write.close().await {
                        log::debug!("[gen {}] Close handshake failed: {}", self.generation, e);
                    }
                    return Ok(());
                }
                frame = self.read.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => self.handle_text(text),
                        Err(_) => log::warn!(
                            "[gen {}] Skipping non UTF-8 binary frame ({} bytes)",
                            self.generation,
                            bytes.len()
                        ),
                    },
                    Some(Ok(Message::Pong(_))) => {
                        if self.state == ConnectionState::AwaitingPong {
                            pong_deadline = None;
                            self.set_state(ConnectionState::Open);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        log::warn!("[gen {}] WebSocket disconnected: {:?}", self.generation, frame);
                        return Err(ConnectionError::RemoteClosed);
                    }
                    // Pings are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::error!("[gen {}] WSS read error: {}", self.generation, e);
                        return Err(ConnectionError::Transport(e.to_string()));
                    }
                    None => {
                        log::warn!("[gen {}] WSS stream ended", self.generation);
                        return Err(ConnectionError::RemoteClosed);
                    }
                },
                _ = heartbeat.tick() => {
                    if self.state == ConnectionState::Open {
                        let limit = self.config.pong_timeout;
                        let ping = Message::Ping(Default::default());
                        send_within(&mut self.write, ping, limit).await?;
                        pong_deadline = Some(Instant::now() + limit);
                        self.set_state(ConnectionState::AwaitingPong);
                    }
                }
                _ = wait_for(pong_deadline) => {
                    log::warn!(
                        "[gen {}] WebSocket unresponsive. Closing connection.",
                        self.generation
                    );
                    return Err(ConnectionError::HeartbeatTimeout(self.config.pong_timeout));
                }
            }
        }
    }

    fn handle_text(&mut self, text: &str) {
        match messages::classify(text) {
            Ok(Inbound::Notification(event)) => {
                match event.subscription_id {
                    Some(id) => match self.subscriptions.get(&id) {
                        Some(address) => log::info!(
                            "[gen {}] New transaction detected for {}: {}",
                            self.generation,
                            address,
                            event.signature
                        ),
                        None => log::warn!(
                            "[gen {}] Transaction {} on unconfirmed subscription {}",
                            self.generation,
                            event.signature,
                            id
                        ),
                    },
                    None => log::info!(
                        "[gen {}] New transaction detected: {}",
                        self.generation,
                        event.signature
                    ),
                }
                // Fire and forget; the outcome arrives on the dispatcher's channel.
                drop(self.dispatcher.dispatch(self.generation, event));
            }
            Ok(Inbound::Confirmed { request_id, subscription_id }) => {
                match self.pending.remove(&request_id) {
                    Some(address) => {
                        log::info!(
                            "[gen {}] Subscribed {} as subscription {}",
                            self.generation,
                            address,
                            subscription_id
                        );
                        self.subscriptions.insert(subscription_id, address);
                    }
                    None => log::debug!(
                        "[gen {}] Confirmation for unknown request {}",
                        self.generation,
                        request_id
                    ),
                }
            }
            Ok(Inbound::Rejected { request_id, code, message }) => {
                let address = request_id.and_then(|id| self.pending.remove(&id));
                log::error!(
                    "[gen {}] Node rejected request {:?} ({}): {} {}",
                    self.generation,
                    request_id,
                    address.as_deref().unwrap_or("unknown address"),
                    code,
                    message
                );
            }
            Ok(Inbound::Ignored) => {
                log::trace!("[gen {}] Ignoring frame: {}", self.generation, text)
            }
            Err(e) => log::warn!(
                "[gen {}] Skipping undecodable frame ({}): {}",
                self.generation,
                e,
                text.chars().take(200).collect::<String>()
            ),
        }
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next {
            log::trace!("[gen {}] State {:?} -> {:?}", self.generation, self.state, next);
            self.state = next;
        }
    }
}

/// Writes `message`, giving up with `HeartbeatTimeout(limit)` if the sink stays blocked.
async fn send_within<W>(
    write: &mut W,
    message: Message,
    limit: Duration,
) -> Result<(), ConnectionError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    match timeout(limit, write.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConnectionError::Transport(e.to_string())),
        Err(_) => Err(ConnectionError::HeartbeatTimeout(limit)),
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Strips the query string so credentials never reach the logs.
fn display_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatcher::DispatchOutcome;
    use crate::test_support::{
        fast_stream_config, notification, spawn_stalled_tcp, spawn_ws, MockSource,
    };
    use serde_json::Value;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::sync::mpsc;

    type Setup = (
        Arc<MockSource>,
        Arc<Dispatcher<MockSource>>,
        mpsc::UnboundedReceiver<DispatchOutcome>,
    );

    fn setup(source: MockSource) -> Setup {
        let source = Arc::new(source);
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&source), tx));
        (source, dispatcher, rx)
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<DispatchOutcome>) -> DispatchOutcome {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for dispatch outcome")
            .expect("outcome channel closed")
    }

    /// Peer that forwards every text frame it reads to `seen_tx`.
    async fn recording_peer(seen_tx: mpsc::UnboundedSender<Value>) -> String {
        spawn_ws(move |_, mut ws| {
            let seen_tx = seen_tx.clone();
            async move {
                while let Some(Ok(Message::Text(text))) = ws.next().await {
                    let _ = seen_tx.send(serde_json::from_str(text.as_str()).unwrap());
                }
            }
        })
        .await
    }

    #[tokio::test]
    async fn test_subscribes_each_address_once_with_unique_ids() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Value>();
        let url = recording_peer(seen_tx).await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A", "B"]));
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();
        assert_eq!(manager.state(), ConnectionState::Open);
        assert_eq!(manager.pending_requests(), 2);

        let first = seen_rx.recv().await.unwrap();
        let second = seen_rx.recv().await.unwrap();
        assert_eq!(first["method"], "logsSubscribe");
        assert_eq!(second["method"], "logsSubscribe");
        assert_eq!(first["params"][0]["mentions"], serde_json::json!(["A"]));
        assert_eq!(second["params"][0]["mentions"], serde_json::json!(["B"]));
        assert_eq!(first["params"][1]["commitment"], "confirmed");
        assert_ne!(first["id"], second["id"]);

        // Nothing else is sent before the first heartbeat.
        let extra = tokio::time::timeout(Duration::from_millis(200), seen_rx.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn test_repeated_address_is_subscribed_once() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<Value>();
        let url = recording_peer(seen_tx).await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A", "A", "B"]));
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();
        assert_eq!(manager.pending_requests(), 2);

        let first = seen_rx.recv().await.unwrap();
        let second = seen_rx.recv().await.unwrap();
        assert_eq!((&first["id"], &second["id"]), (&serde_json::json!(1), &serde_json::json!(2)));
        assert_eq!(first["params"][0]["mentions"], serde_json::json!(["A"]));
        assert_eq!(second["params"][0]["mentions"], serde_json::json!(["B"]));

        let extra = tokio::time::timeout(Duration::from_millis(200), seen_rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra frame: {extra:?}");
    }

    #[tokio::test]
    async fn test_confirmation_maps_subscription_to_address() {
        let (seen_tx, _seen_rx) = mpsc::unbounded_channel::<Value>();
        let url = recording_peer(seen_tx).await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A", "B"]));
        let mut manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();

        manager.handle_text(r#"{"jsonrpc":"2.0","result":555,"id":2}"#);
        assert_eq!(manager.pending_requests(), 1);
        assert_eq!(manager.subscribed_address(555), Some("B"));
        assert_eq!(manager.subscribed_address(1), None);

        // A confirmation for a request never sent changes nothing.
        manager.handle_text(r#"{"jsonrpc":"2.0","result":777,"id":9}"#);
        assert_eq!(manager.pending_requests(), 1);
        assert_eq!(manager.subscribed_address(777), None);
    }

    #[tokio::test]
    async fn test_notification_dispatches_exactly_once() {
        let url = spawn_ws(|_, mut ws| async move {
            let confirm = r#"{"jsonrpc":"2.0","result":24040,"id":1}"#;
            ws.send(Message::Text(confirm.into())).await.unwrap();
            ws.send(Message::Text(notification(24040, "sig123").into())).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let (source, dispatcher, mut rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A"]));
        let manager = SubscriptionManager::connect(4, config, dispatcher).await.unwrap();
        let token = CancellationToken::new();
        let run_token = token.clone();
        let running = tokio::spawn(async move { manager.run(&run_token).await });

        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome.generation, 4);
        assert_eq!(outcome.signature, "sig123");
        assert!(outcome.result.is_ok());
        assert_eq!(source.parsed(), vec![vec!["sig123".to_string()]]);

        token.cancel();
        assert_eq!(running.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_undecodable_frame_is_skipped_and_connection_stays_open() {
        let url = spawn_ws(|_, mut ws| async move {
            ws.send(Message::Text("{{{ not json".into())).await.unwrap();
            ws.send(Message::Text(r#"{"params":{"result":{}}}"#.into())).await.unwrap();
            ws.send(Message::Text(notification(1, "after-garbage").into())).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let (_source, dispatcher, mut rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A"]));
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();
        let token = CancellationToken::new();
        let run_token = token.clone();
        let running = tokio::spawn(async move { manager.run(&run_token).await });

        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome.signature, "after-garbage");
        assert!(!running.is_finished());

        token.cancel();
        assert_eq!(running.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_failed_dispatch_leaves_connection_open() {
        let url = spawn_ws(|_, mut ws| async move {
            ws.send(Message::Text(notification(1, "bad").into())).await.unwrap();
            ws.send(Message::Text(notification(1, "good").into())).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let (_source, dispatcher, mut rx) = setup(MockSource::failing_on(&["bad"]));
        let config = Arc::new(fast_stream_config(url, &["A"]));
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();
        let token = CancellationToken::new();
        let run_token = token.clone();
        let running = tokio::spawn(async move { manager.run(&run_token).await });

        let mut ok = 0;
        let mut failed = 0;
        for _ in 0..2 {
            if next_outcome(&mut rx).await.result.is_ok() {
                ok += 1;
            } else {
                failed += 1;
            }
        }
        assert_eq!((ok, failed), (1, 1));
        assert!(!running.is_finished());

        token.cancel();
        assert_eq!(running.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_responsive_peer_keeps_connection_open() {
        // Reading keeps tungstenite answering pings with pongs.
        let url = spawn_ws(|_, mut ws| async move {
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let mut config = fast_stream_config(url, &["A"]);
        config.heartbeat_interval = Duration::from_millis(50);
        config.pong_timeout = Duration::from_millis(300);
        let config = Arc::new(config);
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();

        let token = CancellationToken::new();
        let window = Duration::from_millis(800);
        let outcome = tokio::time::timeout(window, manager.run(&token)).await;
        assert!(outcome.is_err(), "connection closed early: {outcome:?}");
    }

    #[tokio::test]
    async fn test_silent_peer_triggers_heartbeat_timeout() {
        // Never reading means pings are never answered.
        let url = spawn_ws(|_, ws| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(ws);
        })
        .await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let mut config = fast_stream_config(url, &["A"]);
        config.heartbeat_interval = Duration::from_millis(50);
        config.pong_timeout = Duration::from_millis(150);
        let config = Arc::new(config);
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();

        let token = CancellationToken::new();
        let outcome = tokio::time::timeout(Duration::from_secs(5), manager.run(&token))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Err(ConnectionError::HeartbeatTimeout(Duration::from_millis(150)))
        );
    }

    /// A sink whose buffer never frees up.
    struct BlockedSink;

    impl Sink<Message> for BlockedSink {
        type Error = tungstenite::Error;

        fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn start_send(self: Pin<&mut Self>, _: Message) -> Result<(), Self::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_ping_write_counts_as_heartbeat_timeout() {
        let limit = Duration::from_millis(150);
        let ping = Message::Ping(Default::default());
        let outcome = send_within(&mut BlockedSink, ping, limit).await;
        assert_eq!(outcome, Err(ConnectionError::HeartbeatTimeout(limit)));
    }

    #[tokio::test]
    async fn test_remote_close_is_reported() {
        let url = spawn_ws(|_, mut ws| async move {
            let _ = ws.close(None).await;
        })
        .await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(url, &["A"]));
        let manager = SubscriptionManager::connect(1, config, dispatcher).await.unwrap();

        let token = CancellationToken::new();
        let outcome = tokio::time::timeout(Duration::from_secs(5), manager.run(&token))
            .await
            .unwrap();
        assert!(
            matches!(
                outcome,
                Err(ConnectionError::RemoteClosed) | Err(ConnectionError::Transport(_))
            ),
            "got {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_connect_failure_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let config = Arc::new(fast_stream_config(format!("ws://{addr}"), &["A"]));
        let res = SubscriptionManager::connect(1, config, dispatcher).await;
        assert!(matches!(res, Err(ConnectionError::Connect(_))));
    }

    #[tokio::test]
    async fn test_stalled_handshake_hits_connect_timeout() {
        let url = spawn_stalled_tcp().await;

        let (_source, dispatcher, _rx) = setup(MockSource::default());
        let mut config = fast_stream_config(url, &["A"]);
        config.connect_timeout = Duration::from_millis(200);
        let res = SubscriptionManager::connect(1, Arc::new(config), dispatcher).await;
        let expected = Duration::from_millis(200);
        assert!(matches!(res, Err(ConnectionError::ConnectTimeout(d)) if d == expected));
    }

    #[test]
    fn test_display_url_hides_query() {
        assert_eq!(
            display_url("wss://mainnet.example.com/?api-key=secret"),
            "wss://mainnet.example.com/"
        );
    }
}
