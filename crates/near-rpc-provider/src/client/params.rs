//! Parameter shaping for the node's JSON-RPC methods.
//!
//! `query` requests carry a `request_type` discriminator plus exactly one of
//! `finality` or `block_id`.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::types::{BlockId, BlockSelector, BlockTag, Finality};

/// Body of a `query` request, tagged by `request_type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "request_type", rename_all = "snake_case")]
pub enum QueryRequest {
    ViewAccount {
        account_id: String,
    },
    ViewCode {
        account_id: String,
    },
    ViewState {
        account_id: String,
        prefix_base64: String,
    },
    ViewAccessKey {
        account_id: String,
        public_key: String,
    },
    ViewAccessKeyList {
        account_id: String,
    },
    CallFunction {
        account_id: String,
        method_name: String,
        args_base64: String,
    },
}

/// A full `query` parameter object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Query {
    #[serde(flatten)]
    pub request: QueryRequest,
    #[serde(flatten)]
    pub block: BlockSelector,
}

impl Query {
    pub fn new(request: QueryRequest, tag: &BlockTag) -> Self {
        Self {
            request,
            block: tag.selector(),
        }
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Block selection for `block`. A query with neither field set selects no
/// block and is rejected before it is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finality: Option<Finality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
}

impl BlockQuery {
    /// Most recent block at `finality`.
    pub fn finality(finality: Finality) -> Self {
        Self {
            finality: Some(finality),
            block_id: None,
        }
    }

    /// A specific block.
    pub fn block_id(block_id: impl Into<BlockId>) -> Self {
        Self {
            finality: None,
            block_id: Some(block_id.into()),
        }
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }

    /// Neither finality nor block id is set.
    pub fn is_empty(&self) -> bool {
        self.finality.is_none() && self.block_id.is_none()
    }
}

impl From<&BlockTag> for BlockQuery {
    fn from(tag: &BlockTag) -> Self {
        match tag.selector() {
            BlockSelector::Finality { finality } => Self::finality(finality),
            BlockSelector::BlockId { block_id } => Self::block_id(block_id),
        }
    }
}

/// Chunk selection for `chunk`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChunkQuery {
    ChunkId { chunk_id: String },
    BlockShard { block_id: BlockId, shard_id: u64 },
}

impl ChunkQuery {
    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }
}

/// `block` parameters for the most recent final block.
pub fn final_block() -> Value {
    serde_json::json!({ "finality": Finality::Final.as_str() })
}

/// `gas_price` parameters for the latest block.
pub fn latest_gas_price() -> Value {
    serde_json::json!([null])
}

/// `validators` parameters; `None` is the latest epoch.
pub fn validators(block_id: Option<&BlockId>) -> Result<Value, Error> {
    Ok(serde_json::to_value([block_id])?)
}

/// `tx` parameters.
pub fn tx_status(tx_hash: &str, sender_id: &str) -> Value {
    serde_json::json!([tx_hash, sender_id])
}

/// `broadcast_tx_async` parameters.
pub fn broadcast(signed_base64: &str) -> Value {
    serde_json::json!([signed_base64])
}
