//! # Connection Supervisor
//!
//! Keeps exactly one `SubscriptionManager` alive for the life of the process.
//!
//! The supervisor owns the current manager by value. When that manager's
//! connection closes for any reason (connect failure, transport error, remote
//! close, heartbeat timeout) it is dropped, the supervisor waits the fixed
//! reconnect delay, and a brand-new manager with the next generation number is
//! connected and subscribed from scratch. There is no retry cap and no
//! backoff growth; only cancelling the shutdown token ends the loop.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::configs::watch_config::StreamConfig;
use crate::core::dispatcher::Dispatcher;
use crate::ingestors::solana_wss::{ConnectionError, SubscriptionManager};
use crate::retrieve::parse_api::TransactionSource;

/// Lifecycle notifications published by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new manager is about to connect.
    Connecting { generation: u64 },
    /// The manager connected and sent `requests` subscribe requests.
    Subscribed { generation: u64, requests: usize },
    /// The manager's connection is gone; a replacement follows after the delay.
    Closed { generation: u64, reason: ConnectionError },
}

/// Owns the current subscription manager and replaces it when it closes.
pub struct Supervisor<S> {
    config: Arc<StreamConfig>,
    dispatcher: Arc<Dispatcher<S>>,
    events: broadcast::Sender<SessionEvent>,
}

impl<S: TransactionSource> Supervisor<S> {
    /// Creates a supervisor; nothing connects until [`Supervisor::run`].
    pub fn new(config: StreamConfig, dispatcher: Arc<Dispatcher<S>>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            config: Arc::new(config),
            dispatcher,
            events,
        }
    }

    /// Subscribes to lifecycle events. Slow receivers may miss events.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Runs connect / serve / wait / replace until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        if self.config.tracked_addresses.is_empty() {
            log::warn!(
                "No tracked addresses configured; the connection will carry no subscriptions"
            );
        }

        let mut generation: u64 = 0;

        while !shutdown.is_cancelled() {
            generation += 1;
            self.publish(SessionEvent::Connecting { generation });

            let connecting = SubscriptionManager::connect(
                generation,
                Arc::clone(&self.config),
                Arc::clone(&self.dispatcher),
            );
            let connected = tokio::select! {
                _ = shutdown.cancelled() => break,
                res = connecting => res,
            };

            let closed_with = match connected {
                Ok(manager) => {
                    self.publish(SessionEvent::Subscribed {
                        generation,
                        requests: manager.pending_requests(),
                    });
                    // `run` consumes the manager; it is gone once this returns.
                    match manager.run(&shutdown).await {
                        Ok(()) => break,
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            log::warn!(
                "[gen {}] Connection closed: {}. Reconnecting in {:?}...",
                generation,
                closed_with,
                self.config.reconnect_delay
            );
            self.publish(SessionEvent::Closed {
                generation,
                reason: closed_with,
            });

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        log::info!("Supervisor stopped after {} connection(s)", generation);
    }

    fn publish(&self, event: SessionEvent) {
        // No receivers is normal outside of tests and diagnostics.
        let _ = self.events.send(event);
    }
}
