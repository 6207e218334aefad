//! Core types for the provider.
//!
//! Network identity, block selection and addresses feed the provider's
//! request shaping; the transaction codec decodes submitted payloads; RPC
//! views describe what the node returns.

mod action;
mod address;
mod block_reference;
mod hash;
mod key;
pub mod network;
mod rpc;
mod transaction;

pub use action::{AccessKey, AccessKeyPermission, Action, FunctionCallPermission};
pub use address::Address;
pub use block_reference::{BlockId, BlockSelector, BlockTag, Finality};
pub use hash::CryptoHash;
pub use key::{KeyType, PublicKey, SecretKey, Signature};
pub use network::{
    DEFAULT_URL, EndpointPair, NEAR_BETANET, NEAR_MAINNET, NEAR_TESTNET, NetworkDescriptor,
    Networkish,
};
pub use rpc::{
    AccessKeyDetails, AccessKeyInfoView, AccessKeyListView, AccessKeyPermissionView, AccessKeyView,
    BlockHeaderView, BlockView, CallResult, ChunkHeaderView, ChunkView, ExecutionOutcome,
    ExecutionOutcomeWithId, ExecutionStatus, FinalExecutionOutcome, StateItem, StatusResponse,
    SyncInfo, ViewStateResult,
};
pub use transaction::{SignedTransaction, Transaction};

pub use near_account_id::AccountId;
pub use near_gas::NearGas;
pub use near_token::NearToken;
