//! Cached address history.
//!
//! History lookups hit a rate-limited endpoint, so every successful answer is
//! kept in the [`ResultCache`] under `history_<address>` until its TTL runs
//! out. Failures are returned to the caller and never cached.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;

use crate::core::result_cache::ResultCache;
use crate::retrieve::ky_http::FetchError;
use crate::retrieve::parse_api::TransactionSource;

/// Serves recent transactions per address, from cache when possible.
pub struct HistoryService<S> {
    source: Arc<S>,
    cache: Arc<ResultCache>,
}

fn cache_key(address: &str) -> String {
    format!("history_{address}")
}

impl<S: TransactionSource> HistoryService<S> {
    pub fn new(source: Arc<S>, cache: Arc<ResultCache>) -> Self {
        Self { source, cache }
    }

    /// Recent transactions for `address`.
    ///
    /// # Errors
    /// Returns the upstream [`FetchError`] on a cache miss that fails.
    pub async fn recent_transactions(&self, address: &str) -> Result<Value, FetchError> {
        let key = cache_key(address);
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("History cache hit for {}", address);
            return Ok(hit);
        }

        let fresh = self.source.address_history(address).await?;
        self.cache.set(key, fresh.clone());
        Ok(fresh)
    }

    /// Fetches history for every address concurrently, one result per address in input order.
    pub async fn recent_for_all(
        &self,
        addresses: &[String],
    ) -> Vec<(String, Result<Value, FetchError>)> {
        let lookups = addresses.iter().map(|address| async move {
            let result = self.recent_transactions(address).await;
            (address.clone(), result)
        });
        join_all(lookups).await
    }
}
