//! # One-shot JSON-RPC Calls
//!
//! Peripheral query path: each call picks the next endpoint from an
//! `EndpointPool` and performs a single JSON-RPC request. The push connection
//! and the dispatch path never go through here.

use std::time::Duration;

use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::connections::endpoint_pool::EndpointPool;
use crate::retrieve::ky_http::{ApiClient, FetchError};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC caller that rotates over a pool of endpoints.
pub struct RpcCaller {
    pool: EndpointPool,
    client: ApiClient,
}

impl RpcCaller {
    /// Validates every endpoint in the pool and builds the shared HTTP client.
    pub fn new(pool: EndpointPool, timeout: Duration) -> Result<Self, FetchError> {
        for endpoint in pool.endpoints() {
            Url::parse(endpoint)?;
        }
        // Requests always carry an absolute URL, the base only has to be valid.
        let client = ApiClient::new(&pool.endpoints()[0], None, timeout)?;
        Ok(Self { pool, client })
    }

    /// Calls `method` with `params` on the next endpoint in rotation.
    ///
    /// Returns the `result` member, or `FetchError::Rpc` if the endpoint
    /// answered with an `error` object.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        let url = Url::parse(self.pool.next())?;
        log::debug!("RPC {} -> {}", method, url.host_str().unwrap_or("?"));

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse =
            self.client.request_url(Method::POST, url, Some(&request)).await?;

        if let Some(err) = response.error {
            return Err(FetchError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}
