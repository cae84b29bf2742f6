//! # Event Dispatcher
//!
//! Turns each notified event identifier into an isolated parse request.
//!
//! ## Core Design Principles:
//!
//! 1.  **One task per event**: `dispatch` spawns a fresh tokio task and returns
//!     immediately. A slow or hung upstream call for one event never delays
//!     the receive loop, the heartbeat, or any other dispatch.
//!
//! 2.  **Completion channel**: every task reports a `DispatchOutcome` on an
//!     unbounded MPSC channel. The consumer of that channel decides how results
//!     are surfaced; failures are reported once and then dropped. There is no
//!     retry and no dead-letter store.
//!
//! 3.  **Attribution**: each outcome carries the generation of the connection
//!     that initiated it. Dispatches that are still running when their
//!     connection is replaced are not cancelled; they finish and report under
//!     their original generation.
//!
//! There is no admission control: every notification gets its own task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::retrieve::ky_http::FetchError;
use crate::retrieve::parse_api::TransactionSource;

/// A notification extracted from the push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNotification {
    /// Subscription the notification was delivered on, when the node sent it.
    pub subscription_id: Option<u64>,
    /// Opaque event identifier (transaction signature).
    pub signature: String,
}

/// What a dispatch task reports back when it finishes.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Generation of the connection that received the notification.
    pub generation: u64,
    /// The event identifier that was parsed.
    pub signature: String,
    /// The parsed result or the reason it could not be obtained.
    pub result: Result<Value, FetchError>,
    /// Wall time spent in the upstream call.
    pub elapsed: Duration,
}

/// Spawns one parse task per notification and collects their outcomes.
pub struct Dispatcher<S> {
    source: Arc<S>,
    outcomes: mpsc::UnboundedSender<DispatchOutcome>,
    in_flight: Arc<AtomicUsize>,
}

impl<S: TransactionSource> Dispatcher<S> {
    /// Creates a dispatcher that reports to `outcomes`.
    pub fn new(source: Arc<S>, outcomes: mpsc::UnboundedSender<DispatchOutcome>) -> Self {
        Self {
            source,
            outcomes,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Starts parsing `event` in its own task and returns without waiting.
    ///
    /// The returned handle may be dropped; the task keeps running detached.
    pub fn dispatch(&self, generation: u64, event: EventNotification) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let outcomes = self.outcomes.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        log::debug!(
            "Dispatching {} (generation {}, subscription {:?})",
            event.signature,
            generation,
            event.subscription_id
        );

        tokio::spawn(async move {
            let started = Instant::now();
            let batch = vec![event.signature.clone()];
            let result = source.parse_transactions(&batch).await;

            in_flight.fetch_sub(1, Ordering::SeqCst);

            let outcome = DispatchOutcome {
                generation,
                signature: event.signature,
                result,
                elapsed: started.elapsed(),
            };

            if let Err(mpsc::error::SendError(outcome)) = outcomes.send(outcome) {
                log::warn!(
                    "Outcome receiver gone, dropping result for {}",
                    outcome.signature
                );
            }
        })
    }

    /// Number of dispatches that have started but not yet finished their upstream call.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
