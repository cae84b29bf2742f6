//! # Endpoint Pool
//!
//! Hands out a fixed list of endpoints in rotating order. The only state is
//! the rotation index, kept in an atomic so a shared pool never needs a lock.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

/// Returned when a pool is built from an empty endpoint list.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("endpoint pool requires at least one endpoint")]
pub struct EmptyPoolError;

/// A fixed, ordered set of endpoints served round-robin.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<String>,
    next_index: AtomicUsize,
}

impl EndpointPool {
    /// Creates a pool that starts at the first endpoint.
    pub fn new(endpoints: Vec<String>) -> Result<Self, EmptyPoolError> {
        if endpoints.is_empty() {
            return Err(EmptyPoolError);
        }
        Ok(Self {
            endpoints,
            next_index: AtomicUsize::new(0),
        })
    }

    /// Returns the next endpoint, wrapping around after the last one.
    pub fn next(&self) -> &str {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[index]
    }

    /// All endpoints, in rotation order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Number of endpoints in the rotation.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always `false`; an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
