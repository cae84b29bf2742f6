//! # Parse API Client
//!
//! The two operations of the upstream parsing service:
//!
//! - **batch-parse**: `POST {parse_path}` with `{"transactions": [signature, ...]}`.
//! - **history-fetch**: `GET {history_path}` with `{address}` substituted.
//!
//! Both return the upstream JSON untouched. The pipeline only depends on the
//! `TransactionSource` trait, so dispatch and history code can be exercised
//! against an in-memory source.

use std::future::Future;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::configs::watch_config::FetchConfig;
use crate::retrieve::ky_http::{ApiClient, FetchError};

/// Anything that can turn event identifiers and addresses into parsed results.
pub trait TransactionSource: Send + Sync + 'static {
    /// Parses the given signatures in one upstream call.
    fn parse_transactions(
        &self,
        signatures: &[String],
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// Fetches the recent parsed history of one address.
    fn address_history(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    transactions: &'a [String],
}

/// HTTP implementation of [`TransactionSource`].
pub struct ParseApi {
    client: ApiClient,
    parse_path: String,
    history_path: String,
}

impl ParseApi {
    /// Builds the client from explicit configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: ApiClient::new(
                &config.base_url,
                config.api_key.clone(),
                config.request_timeout,
            )?,
            parse_path: config.parse_path.clone(),
            history_path: config.history_path.clone(),
        })
    }

    fn history_path_for(&self, address: &str) -> String {
        self.history_path.replace("{address}", address)
    }
}

impl TransactionSource for ParseApi {
    async fn parse_transactions(&self, signatures: &[String]) -> Result<Value, FetchError> {
        log::trace!("Parsing {} transaction(s) upstream", signatures.len());
        let body = ParseRequest {
            transactions: signatures,
        };
        self.client.request(Method::POST, &self.parse_path, Some(&body)).await
    }

    async fn address_history(&self, address: &str) -> Result<Value, FetchError> {
        log::trace!("Fetching history for {}", address);
        let path = self.history_path_for(address);
        self.client.request::<Value, ()>(Method::GET, &path, None).await
    }
}
