//! Client module for talking to NEAR JSON-RPC nodes.
//!
//! - [`NearRpcProvider`] - The provider: transport, archival fallback,
//!   per-turn response cache and capability accessors
//! - [`ProviderBuilder`] - Fluent builder for configuring the provider
//! - [`retry`] - Retry-with-delay combinator for any fallible async call
//!
//! # Request flow
//!
//! | Step | What happens |
//! |------|--------------|
//! | encode | `{method, params, id, jsonrpc: "2.0"}`, ids start above 52 |
//! | cache | `status`, `EXPERIMENTAL_genesis_config` and `block` are reused within a turn |
//! | primary | POST to the primary endpoint |
//! | archival | On `UNKNOWN_BLOCK` / `UNKNOWN_TRANSACTION`, the same request once more to the archival endpoint |
//!
//! Every phase is reported as a [`DebugEvent`] to the provider base and to
//! listeners registered with [`ProviderBuilder::on_debug`].

mod base;
mod cache;
mod codec;
mod detect;
mod params;
mod provider;
mod retry;
mod transaction;

pub use base::{DebugAction, DebugEvent, DebugListener, DebugOutcome, DefaultBase, ProviderBase};
pub use cache::{CACHED_METHODS, CacheKeying};
pub use codec::{REQUEST_ID_START, RpcRequest, RpcResponse, WireError, decode, decode_body, encode};
pub use detect::{GENESIS_CONFIG_METHOD, STATUS_METHOD, detect_network};
pub use params::{BlockQuery, ChunkQuery, Query, QueryRequest};
pub use provider::{NearRpcProvider, ProviderBuilder, ReadyState};
pub use retry::{BackoffFn, DEFAULT_RETRY_DELAY, RetryConfig, Retrying, retry, retry_fixed};
pub use transaction::{TransactionReceipt, TransactionResponse};
