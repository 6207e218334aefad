//! Integration tests for near-rpc-provider.
//!
//! These tests run against in-process mock JSON-RPC servers.
//!
//! Run with: `cargo test --test integration`

mod accessors;
mod detection;
mod transactions;
