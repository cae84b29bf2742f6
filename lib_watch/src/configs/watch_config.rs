//! # Watch Configuration
//!
//! Explicit settings for each pipeline component. Every timing value that the
//! pipeline depends on lives here so that nothing is embedded as a constant in
//! the components themselves.

use std::time::Duration;

/// Settings for the push connection and its supervisor.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket endpoint, including any credentials in the query string.
    pub ws_url: String,
    /// Addresses subscribed on every (re)connect.
    pub tracked_addresses: Vec<String>,
    /// Commitment level requested for `logsSubscribe`.
    pub commitment: String,
    /// How often a ping is sent while the connection is open.
    pub heartbeat_interval: Duration,
    /// How long to wait for the pong before the connection is dropped.
    pub pong_timeout: Duration,
    /// Fixed delay before a replacement connection is created.
    pub reconnect_delay: Duration,
    /// Upper bound on the WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://mainnet.helius-rpc.com/".to_string(),
            tracked_addresses: Vec::new(),
            commitment: "confirmed".to_string(),
            heartbeat_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Bounds for the history result cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of entries kept before LRU eviction.
    pub max_entries: usize,
    /// Age after which an entry is no longer served.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: Duration::from_secs(300),
        }
    }
}

/// Upstream parsing service settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Absolute base URL, joined with the paths below.
    pub base_url: String,
    /// Sent as the `api-key` query parameter when present.
    pub api_key: Option<String>,
    /// Relative path of the batch-parse endpoint.
    pub parse_path: String,
    /// Relative path of the history endpoint; `{address}` is substituted.
    pub history_path: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.helius.xyz/".to_string(),
            api_key: None,
            parse_path: "v0/transactions/".to_string(),
            history_path: "v0/addresses/{address}/transactions/".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
