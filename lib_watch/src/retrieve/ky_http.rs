//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous JSON client wrapper around `reqwest`.
//! Every call is a single attempt: the response is either decoded into the
//! requested type or translated into a `FetchError` that tells the caller what
//! went wrong (transport, upstream status, or payload).

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failures of a single upstream call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("failed to decode upstream payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A JSON-RPC endpoint answered with an `error` object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The base URL or a joined path was not a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A small asynchronous JSON HTTP client.
///
/// Holds the base URL all relative paths are joined to and an optional API
/// key that is appended to every request as the `api-key` query parameter.
pub struct ApiClient {
    /// The underlying pooled client, configured with the request timeout.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// Optional credential appended to each request URL.
    api_key: Option<String>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - Absolute base URL (e.g. "https://api.example.com/").
    /// * `api_key` - Optional key sent as the `api-key` query parameter.
    /// * `timeout` - Upper bound for a whole request, response body included.
    ///
    /// # Errors
    /// Returns `FetchError::InvalidUrl` if `base_url` is not an absolute URL.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)?;

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lib_watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner,
            base_url,
            api_key,
        })
    }

    /// Resolves `path` against the base URL and attaches the API key.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.join(path)?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("api-key", key);
        }
        Ok(url)
    }

    /// Performs one HTTP request and decodes the JSON response.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb.
    /// * `path` - Path relative to the base URL.
    /// * `body` - Optional value serialized as the JSON request body.
    ///
    /// # Errors
    /// * `FetchError::Network` when no response was received.
    /// * `FetchError::Upstream` for non-2xx statuses, with the response text.
    /// * `FetchError::Decode` when the body does not deserialize into `T`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.request_url(method, url, body).await
    }

    /// Same as [`ApiClient::request`] but against an already resolved URL.
    pub async fn request_url<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self.inner.request(method, url);

        if let Some(b) = body {
            let json_body = serde_json::to_vec(b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            // The body is only diagnostic here, an unreadable one is not worth a second error.
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
