//! A JSON-RPC provider for NEAR Protocol.
//!
//! **near-rpc-provider** talks to NEAR nodes over JSON-RPC. It detects which
//! network the node serves, falls back to an archival node when the primary
//! has pruned the requested data, and collapses duplicate polls issued within
//! one scheduler turn.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use near_rpc_provider::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), near_rpc_provider::Error> {
//!     let provider = NearRpcProvider::testnet().build()?;
//!
//!     // Waits for network detection
//!     let network = provider.ready().await?;
//!     println!("Connected to {network}");
//!
//!     let height = provider.get_block_number().await?;
//!     let balance = provider.get_balance("alice.testnet", BlockTag::Latest).await?;
//!     println!("{balance} at block {height}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Networks
//!
//! | Name | Chain id | Archival |
//! |------|----------|----------|
//! | `near-mainnet` | `mainnet` | yes |
//! | `near-testnet` | `testnet` | yes |
//! | `near-betanet` | `betanet` | no |
//!
//! Chain ids are the node's chain id string read as a big-endian integer.
//!
//! # Retrying
//!
//! The provider never retries on its own beyond the archival fallback. Wrap
//! any call with [`retry`] when transient failures should be absorbed:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use near_rpc_provider::{NearRpcProvider, retry};
//!
//! # async fn example(provider: NearRpcProvider) -> Result<(), near_rpc_provider::Error> {
//! let height = retry(|()| provider.get_block_number(), 3, |_| Duration::from_secs(1))
//!     .call(())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    ARCHIVAL_CAUSES, Error, ErrorCause, HANDLER_ERROR, NetworkError, NetworkEvent, ParseHashError,
    ParseKeyError, RpcError,
};
pub use types::*;

// Re-export client types
pub use client::{
    BlockQuery, CacheKeying, ChunkQuery, DebugAction, DebugEvent, DebugListener, DebugOutcome,
    DefaultBase, NearRpcProvider, ProviderBase, ProviderBuilder, ReadyState, RetryConfig,
    Retrying, RpcRequest, TransactionReceipt, TransactionResponse, retry, retry_fixed,
};
