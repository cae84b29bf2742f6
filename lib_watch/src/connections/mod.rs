//! # Connections Module
//!
//! Handles the set of backend endpoints used by peripheral one-shot queries.

/// Round-robin selection over a fixed list of endpoints.
pub mod endpoint_pool;
