//! # lib_watch
//!
//! Real-time address watching pipeline. A supervised WebSocket subscription
//! streams `logsSubscribe` notifications for a fixed set of tracked
//! addresses, every notification is parsed upstream in its own task, and
//! historical queries are served through a bounded, expiring cache.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

// Declare the modules to re-export
pub mod configs;
pub mod connections;
pub mod core;
pub mod ingestors;
pub mod retrieve;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export everything callers need to assemble the pipeline
pub use configs::watch_config::{CacheConfig, FetchConfig, StreamConfig};
pub use connections::endpoint_pool::{EmptyPoolError, EndpointPool};
pub use core::dispatcher::{DispatchOutcome, Dispatcher, EventNotification};
pub use core::history::HistoryService;
pub use core::result_cache::ResultCache;
pub use core::supervisor::{SessionEvent, Supervisor};
pub use ingestors::solana_wss::{ConnectionError, ConnectionState, SubscriptionManager};
pub use retrieve::ky_http::{ApiClient, FetchError};
pub use retrieve::parse_api::{ParseApi, TransactionSource};
pub use retrieve::rpc_call::RpcCaller;
