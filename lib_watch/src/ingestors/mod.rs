//! # Data Ingestors Module
//!
//! Clients that bring external events into the pipeline.
//!
//! ## Contained Modules:
//! - **`solana_wss`**: One WebSocket connection subscribed to `logsSubscribe`
//!   for every tracked address, with ping/pong liveness detection.
//! - **`messages`**: The JSON-RPC frames exchanged on that connection.

/// JSON-RPC request and notification frames of the push connection.
pub mod messages;
/// The per-connection subscription manager.
pub mod solana_wss;

// --- Public API Re-exports ---
pub use solana_wss::{ConnectionError, ConnectionState, SubscriptionManager};
