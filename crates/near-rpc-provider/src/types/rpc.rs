//! RPC response types.
//!
//! Views keep the fields the provider reads as typed values and carry everything
//! else through `extra`, so a node adding fields never breaks decoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CryptoHash, PublicKey};
use near_token::NearToken;

// ============================================================================
// Node status
// ============================================================================

/// Response of the `status` method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusResponse {
    /// Chain id name, e.g. `testnet`.
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub protocol_version: Option<u32>,
    #[serde(default)]
    pub sync_info: Option<SyncInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sync progress reported by `status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncInfo {
    pub latest_block_hash: CryptoHash,
    pub latest_block_height: u64,
    #[serde(default)]
    pub syncing: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Blocks and chunks
// ============================================================================

/// Response of the `block` method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockView {
    pub author: String,
    pub header: BlockHeaderView,
    #[serde(default)]
    pub chunks: Vec<ChunkHeaderView>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockHeaderView {
    pub height: u64,
    pub hash: CryptoHash,
    pub prev_hash: CryptoHash,
    /// Nanoseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkHeaderView {
    pub chunk_hash: CryptoHash,
    pub shard_id: u64,
    #[serde(default)]
    pub height_included: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of the `chunk` method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkView {
    pub author: String,
    pub header: ChunkHeaderView,
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub receipts: Vec<Value>,
}

// ============================================================================
// Query results
// ============================================================================

/// `view_access_key` result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: AccessKeyPermissionView,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

/// Access key permission as rendered by the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum AccessKeyPermissionView {
    FullAccess,
    FunctionCall {
        allowance: Option<NearToken>,
        receiver_id: String,
        method_names: Vec<String>,
    },
}

/// `view_access_key_list` result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessKeyListView {
    pub keys: Vec<AccessKeyInfoView>,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessKeyInfoView {
    pub public_key: PublicKey,
    pub access_key: AccessKeyDetails,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessKeyDetails {
    pub nonce: u64,
    pub permission: AccessKeyPermissionView,
}

/// `view_state` result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewStateResult {
    pub values: Vec<StateItem>,
    #[serde(default)]
    pub proof: Vec<Value>,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

/// One contract storage entry; key and value are base64.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StateItem {
    pub key: String,
    pub value: String,
}

impl StateItem {
    /// Decoded key bytes.
    pub fn key_bytes(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.key).ok()
    }

    /// Decoded value bytes.
    pub fn value_bytes(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.value).ok()
    }
}

/// `call_function` result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallResult {
    pub result: Vec<u8>,
    #[serde(default)]
    pub logs: Vec<String>,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

impl CallResult {
    /// Decode the returned bytes as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.result)
    }
}

// ============================================================================
// Transaction outcomes
// ============================================================================

/// Response of the `tx` method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FinalExecutionOutcome {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub transaction: Value,
    pub transaction_outcome: ExecutionOutcomeWithId,
    #[serde(default)]
    pub receipts_outcome: Vec<ExecutionOutcomeWithId>,
}

/// Execution status of a transaction or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExecutionStatus {
    Unknown,
    Pending,
    Failure(Value),
    /// Base64 return value.
    SuccessValue(String),
    SuccessReceiptId(CryptoHash),
}

impl ExecutionStatus {
    /// Returns true for either success variant.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::SuccessValue(_) | ExecutionStatus::SuccessReceiptId(_)
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionOutcomeWithId {
    pub id: CryptoHash,
    pub block_hash: CryptoHash,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionOutcome {
    pub executor_id: String,
    pub gas_burnt: u64,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub receipt_ids: Vec<CryptoHash>,
    pub status: ExecutionStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
