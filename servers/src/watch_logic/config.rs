use anyhow::{Context, Result};
use clap::Parser;
use lib_watch::{CacheConfig, FetchConfig, StreamConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Address activity watcher (logsSubscribe + transaction parsing)", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "WATCH_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "WATCH_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(
        long,
        env = "WATCH_LOG_LEVEL",
        help = "Logging level (trace, debug, info, warn, error).",
    )]
    pub log_level: Option<String>,

    #[clap(long, env = "WATCH_WS_URL", help = "Push (WebSocket) endpoint.")]
    pub ws_url: Option<String>,

    #[clap(long, env = "WATCH_PARSE_BASE_URL", help = "Base URL of the transaction parsing API.")]
    pub parse_base_url: Option<String>,

    #[clap(
        long,
        env = "WATCH_PARSE_PATH",
        help = "Path of the batch parse endpoint, relative to the base URL.",
    )]
    pub parse_path: Option<String>,

    #[clap(
        long,
        env = "WATCH_HISTORY_PATH",
        help = "Path of the history endpoint; {address} is substituted.",
    )]
    pub history_path: Option<String>,

    #[clap(long, env = "WATCH_API_KEY", help = "API key sent to the push and parsing endpoints.")]
    pub api_key: Option<String>,

    #[clap(
        long,
        env = "WATCH_RPC_ENDPOINTS",
        value_delimiter = ',',
        help = "Comma separated JSON-RPC endpoints used round-robin.",
    )]
    pub rpc_endpoints: Option<Vec<String>>,

    #[clap(
        long,
        env = "WATCH_TRACKED_ADDRESSES",
        value_delimiter = ',',
        help = "Comma separated addresses to watch.",
    )]
    pub tracked_addresses: Option<Vec<String>>,

    #[clap(long, env = "WATCH_COMMITMENT", help = "Commitment level for subscriptions.")]
    pub commitment: Option<String>,

    #[clap(
        long,
        env = "WATCH_HEARTBEAT_INTERVAL_SECONDS",
        help = "Seconds between pings on an open connection.",
    )]
    pub heartbeat_interval_seconds: Option<u64>,

    #[clap(
        long,
        env = "WATCH_PONG_TIMEOUT_SECONDS",
        help = "Seconds to wait for a pong before dropping the connection.",
    )]
    pub pong_timeout_seconds: Option<u64>,

    #[clap(long, env = "WATCH_RECONNECT_DELAY_SECONDS", help = "Fixed delay before reconnecting.")]
    pub reconnect_delay_seconds: Option<u64>,

    #[clap(
        long,
        env = "WATCH_CONNECT_TIMEOUT_SECONDS",
        help = "Upper bound on the WebSocket handshake.",
    )]
    pub connect_timeout_seconds: Option<u64>,

    #[clap(
        long,
        env = "WATCH_REQUEST_TIMEOUT_SECONDS",
        help = "Per-request timeout for HTTP calls.",
    )]
    pub request_timeout_seconds: Option<u64>,

    #[clap(long, env = "WATCH_CACHE_MAX_ENTRIES", help = "Maximum entries in the history cache.")]
    pub cache_max_entries: Option<usize>,

    #[clap(
        long,
        env = "WATCH_CACHE_TTL_SECONDS",
        help = "Seconds a cached history entry stays valid.",
    )]
    pub cache_ttl_seconds: Option<u64>,

    #[clap(
        long,
        env = "WATCH_SKIP_HISTORY",
        help = "Skip the start-up history fetch (true/false).",
    )]
    pub skip_history: Option<bool>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            ws_url: other.ws_url.or(self.ws_url),
            parse_base_url: other.parse_base_url.or(self.parse_base_url),
            parse_path: other.parse_path.or(self.parse_path),
            history_path: other.history_path.or(self.history_path),
            api_key: other.api_key.or(self.api_key),
            rpc_endpoints: other.rpc_endpoints.or(self.rpc_endpoints),
            tracked_addresses: other.tracked_addresses.or(self.tracked_addresses),
            commitment: other.commitment.or(self.commitment),
            heartbeat_interval_seconds: other
                .heartbeat_interval_seconds
                .or(self.heartbeat_interval_seconds),
            pong_timeout_seconds: other.pong_timeout_seconds.or(self.pong_timeout_seconds),
            reconnect_delay_seconds: other.reconnect_delay_seconds.or(self.reconnect_delay_seconds),
            connect_timeout_seconds: other.connect_timeout_seconds.or(self.connect_timeout_seconds),
            request_timeout_seconds: other.request_timeout_seconds.or(self.request_timeout_seconds),
            cache_max_entries: other.cache_max_entries.or(self.cache_max_entries),
            cache_ttl_seconds: other.cache_ttl_seconds.or(self.cache_ttl_seconds),
            skip_history: other.skip_history.or(self.skip_history),
        }
    }

    fn defaults() -> Config {
        let stream = StreamConfig::default();
        let fetch = FetchConfig::default();
        let cache = CacheConfig::default();
        Config {
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            ws_url: Some(stream.ws_url),
            parse_base_url: Some(fetch.base_url),
            parse_path: Some(fetch.parse_path),
            history_path: Some(fetch.history_path),
            rpc_endpoints: Some(vec!["https://api.mainnet-beta.solana.com".to_string()]),
            tracked_addresses: Some(Vec::new()),
            commitment: Some(stream.commitment),
            heartbeat_interval_seconds: Some(stream.heartbeat_interval.as_secs()),
            pong_timeout_seconds: Some(stream.pong_timeout.as_secs()),
            reconnect_delay_seconds: Some(stream.reconnect_delay.as_secs()),
            connect_timeout_seconds: Some(stream.connect_timeout.as_secs()),
            request_timeout_seconds: Some(fetch.request_timeout.as_secs()),
            cache_max_entries: Some(cache.max_entries),
            cache_ttl_seconds: Some(cache.ttl.as_secs()),
            skip_history: Some(false),
            ..Default::default()
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn skip_history(&self) -> bool {
        self.skip_history.unwrap_or(false)
    }

    /// Tracked addresses, trimmed, without blanks and without repeats (first occurrence wins).
    pub fn tracked_addresses(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tracked_addresses
            .iter()
            .flatten()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && seen.insert(a.clone()))
            .collect()
    }

    pub fn rpc_endpoints(&self) -> Vec<String> {
        self.rpc_endpoints.clone().unwrap_or_default()
    }

    /// Push connection settings. The API key, when set, is appended to the URL as `api-key`.
    pub fn stream_config(&self) -> Result<StreamConfig> {
        let base = StreamConfig::default();
        let raw_url = self.ws_url.clone().unwrap_or(base.ws_url);
        let mut ws_url =
            Url::parse(&raw_url).with_context(|| format!("invalid ws_url '{raw_url}'"))?;
        if let Some(key) = &self.api_key {
            ws_url.query_pairs_mut().append_pair("api-key", key);
        }

        Ok(StreamConfig {
            ws_url: ws_url.to_string(),
            tracked_addresses: self.tracked_addresses(),
            commitment: self.commitment.clone().unwrap_or(base.commitment),
            heartbeat_interval: secs_or(self.heartbeat_interval_seconds, base.heartbeat_interval),
            pong_timeout: secs_or(self.pong_timeout_seconds, base.pong_timeout),
            reconnect_delay: secs_or(self.reconnect_delay_seconds, base.reconnect_delay),
            connect_timeout: secs_or(self.connect_timeout_seconds, base.connect_timeout),
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let base = FetchConfig::default();
        FetchConfig {
            base_url: self.parse_base_url.clone().unwrap_or(base.base_url),
            api_key: self.api_key.clone(),
            parse_path: self.parse_path.clone().unwrap_or(base.parse_path),
            history_path: self.history_path.clone().unwrap_or(base.history_path),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        let base = CacheConfig::default();
        CacheConfig {
            max_entries: self.cache_max_entries.unwrap_or(base.max_entries),
            ttl: secs_or(self.cache_ttl_seconds, base.ttl),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        secs_or(self.request_timeout_seconds, FetchConfig::default().request_timeout)
    }
}

fn secs_or(value: Option<u64>, fallback: Duration) -> Duration {
    value.map(Duration::from_secs).unwrap_or(fallback)
}

/// Reads a JSON config file, returning `None` (with a log line) when it is missing or unusable.
fn read_config_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        log::info!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            path.display()
        );
        return None;
    }
    match fs::read_to_string(path) {
        Ok(config_str) => match serde_json::from_str::<Config>(&config_str) {
            Ok(file_config) => Some(file_config),
            Err(e) => {
                log::warn!(
                    "Failed to parse config file {}: {}. Falling back to other sources.",
                    path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            log::warn!(
                "Failed to read config file {}: {}. Falling back to other sources.",
                path.display(),
                e
            );
            None
        }
    }
}

/// Layers defaults, the config file and already-parsed CLI/env values.
pub fn resolve_config(cli: Config) -> Config {
    // 1. Defaults
    let mut current_config = Config::defaults();

    // 2. Config file (server_watch.conf unless overridden)
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("server_watch.conf"));
    if let Some(file_config) = read_config_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }

    // 3. Environment variables and CLI arguments win
    current_config.merge(cli)
}

pub fn load_config() -> Config {
    // Pick up a local .env before clap reads the environment.
    let _ = dotenvy::dotenv();
    resolve_config(Config::parse())
}
