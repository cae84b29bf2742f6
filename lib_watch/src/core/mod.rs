//! # Core Pipeline Module
//!
//! Components that sit between the push connection and the upstream APIs.
//!
//! ## Contained Modules:
//! - **`dispatcher`**: Spawns one isolated parse task per notification.
//! - **`history`**: Cached per-address history lookups.
//! - **`result_cache`**: Bounded LRU store with a time-to-live.
//! - **`supervisor`**: Keeps one subscription manager alive, replacing it
//!   after a fixed delay whenever its connection closes.

pub mod dispatcher;
pub mod history;
pub mod result_cache;
pub mod supervisor;
