//! # Data Retrieval Module
//!
//! HTTP clients for the upstream parsing service and for one-shot JSON-RPC
//! calls.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic JSON `ApiClient` built on `reqwest`. It makes
//!   exactly one attempt per call and reports failures as a typed
//!   `FetchError`; retry policy belongs to the caller.
//! - **`parse_api`**: The `TransactionSource` seam and its HTTP
//!   implementation (batch-parse and address history).
//! - **`rpc_call`**: One-shot JSON-RPC calls spread over an `EndpointPool`.

/// Generic JSON HTTP client with typed failures.
pub mod ky_http;
/// Batch-parse and history-fetch operations of the upstream service.
pub mod parse_api;
/// One-shot JSON-RPC calls over a round-robin endpoint pool.
pub mod rpc_call;
