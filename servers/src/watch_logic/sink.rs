//! Consumes dispatch outcomes and reports them.
//!
//! Parsed transactions are logged at info; failures are logged once at warn
//! and dropped. After shutdown the sink keeps draining until the channel closes
//! or the grace period runs out, whichever comes first.

use std::time::Duration;

use lib_watch::DispatchOutcome;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkStats {
    pub parsed: usize,
    pub failed: usize,
}

impl SinkStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome.result {
            Ok(parsed) => {
                self.parsed += 1;
                log::info!(
                    "[gen {}] {} parsed in {} ms: {}",
                    outcome.generation,
                    outcome.signature,
                    outcome.elapsed.as_millis(),
                    summarize(&parsed)
                );
            }
            Err(e) => {
                self.failed += 1;
                log::warn!(
                    "[gen {}] {} could not be parsed after {} ms: {}",
                    outcome.generation,
                    outcome.signature,
                    outcome.elapsed.as_millis(),
                    e
                );
            }
        }
    }
}

/// Short human-readable description of a parse response.
fn summarize(parsed: &Value) -> String {
    let first = match parsed {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    match first {
        Some(tx) => {
            let kind = tx.get("type").and_then(Value::as_str).unwrap_or("UNKNOWN");
            match tx.get("description").and_then(Value::as_str) {
                Some(desc) if !desc.is_empty() => format!("{kind} - {desc}"),
                _ => kind.to_string(),
            }
        }
        None => "empty response".to_string(),
    }
}

pub async fn run(
    mut outcomes: mpsc::UnboundedReceiver<DispatchOutcome>,
    shutdown: CancellationToken,
    grace: Duration,
) -> SinkStats {
    let mut stats = SinkStats::default();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = outcomes.recv() => match next {
                Some(outcome) => stats.record(outcome),
                None => return stats,
            },
        }
    }

    let deadline = Instant::now() + grace;
    loop {
        match timeout_at(deadline, outcomes.recv()).await {
            Ok(Some(outcome)) => stats.record(outcome),
            Ok(None) => break,
            Err(_) => {
                log::warn!("Shutdown grace period elapsed with dispatches still outstanding");
                break;
            }
        }
    }

    log::info!("Outcome sink stopped: {} parsed, {} failed", stats.parsed, stats.failed);
    stats
}
