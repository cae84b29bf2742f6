use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use lib_watch::{
    Dispatcher, EndpointPool, HistoryService, ParseApi, ResultCache, RpcCaller, Supervisor,
};
use serde_json::{json, Value};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod watch_logic;
use watch_logic::{config, logger, sink};

/// How long outstanding dispatches may keep reporting after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();

    let config = config::load_config();
    logger::setup_logging(&config.log_dir(), config.log_level())?;

    let stream_config = config.stream_config()?;
    let fetch_config = config.fetch_config();
    let tracked = stream_config.tracked_addresses.clone();
    log::info!("Watching {} address(es): {:?}", tracked.len(), tracked);

    check_rpc(config.rpc_endpoints(), config.request_timeout()).await;

    let source = Arc::new(ParseApi::new(&fetch_config)?);
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&source), outcome_tx));

    let shutdown = CancellationToken::new();

    let sink_handle = tokio::spawn(sink::run(outcome_rx, shutdown.clone(), SHUTDOWN_GRACE));

    let supervisor = Supervisor::new(stream_config, dispatcher);
    let supervisor_handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { supervisor.run(shutdown).await }
    });

    if config.skip_history() {
        log::info!("Skipping start-up history fetch");
    } else {
        let cache = Arc::new(ResultCache::new(config.cache_config()));
        let history = HistoryService::new(source, cache);
        for (address, result) in history.recent_for_all(&tracked).await {
            match result {
                Ok(Value::Array(txs)) => log::info!(
                    "History for {}: {} recent transaction(s)",
                    address,
                    txs.len()
                ),
                Ok(other) => log::info!("History for {}: {}", address, other),
                Err(e) => log::warn!("History for {} unavailable: {}", address, e),
            }
        }
    }

    log::info!("Initialisation completed in {} ms", started.elapsed().as_millis());

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = terminate() => {
            log::info!("SIGTERM received, initiating shutdown.");
        }
    }

    shutdown.cancel();

    if let Err(e) = supervisor_handle.await {
        log::error!("Supervisor task failed: {}", e);
    }
    match sink_handle.await {
        Ok(stats) => log::info!("Final tally: {} parsed, {} failed", stats.parsed, stats.failed),
        Err(e) => log::error!("Outcome sink task failed: {}", e),
    }

    log::info!("Shutdown complete.");
    Ok(())
}

/// Start-up connectivity check over the JSON-RPC pool. Failures are logged only.
async fn check_rpc(endpoints: Vec<String>, timeout: Duration) {
    let pool = match EndpointPool::new(endpoints) {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("Skipping RPC check: {}", e);
            return;
        }
    };
    let caller = match RpcCaller::new(pool, timeout) {
        Ok(caller) => caller,
        Err(e) => {
            log::warn!("Skipping RPC check: {}", e);
            return;
        }
    };
    match caller.call("getSlot", json!([])).await {
        Ok(slot) => log::info!("RPC reachable, current slot {}", slot),
        Err(e) => log::warn!("RPC check failed: {}", e),
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut term_signal) => {
            term_signal.recv().await;
        }
        Err(e) => {
            log::warn!("Could not install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    // On non-unix platforms, just wait forever.
    std::future::pending::<()>().await;
}
