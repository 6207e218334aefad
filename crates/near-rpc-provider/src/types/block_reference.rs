//! Block tags and the finality-or-block-id selector used by state queries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Finality level for queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    /// Latest optimistic block. Fastest, but may be reorged.
    Optimistic,
    /// Doomslug finality.
    #[serde(rename = "near-final")]
    NearFinal,
    /// Fully finalized.
    #[default]
    Final,
}

impl Finality {
    /// Get the string representation for RPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Finality::Optimistic => "optimistic",
            Finality::NearFinal => "near-final",
            Finality::Final => "final",
        }
    }
}

/// A literal block identifier: height or base58 hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        Self::Height(height)
    }
}

impl From<&str> for BlockId {
    fn from(hash: &str) -> Self {
        Self::Hash(hash.to_string())
    }
}

impl From<String> for BlockId {
    fn from(hash: String) -> Self {
        Self::Hash(hash)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Height(h) => write!(f, "{h}"),
            BlockId::Hash(h) => f.write_str(h),
        }
    }
}

/// Block a caller asks a state query to run against.
///
/// `Latest` is the sentinel for "most recent final block"; anything else is
/// sent to the node verbatim as `block_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockTag {
    #[default]
    Latest,
    Height(u64),
    Hash(String),
}

impl BlockTag {
    /// The wire selector for this tag.
    pub fn selector(&self) -> BlockSelector {
        match self {
            BlockTag::Latest => BlockSelector::Finality {
                finality: Finality::Final,
            },
            BlockTag::Height(h) => BlockSelector::BlockId {
                block_id: BlockId::Height(*h),
            },
            BlockTag::Hash(h) => BlockSelector::BlockId {
                block_id: BlockId::Hash(h.clone()),
            },
        }
    }

    /// Parse a loosely-typed tag as accepted by `perform`.
    ///
    /// `null`, `"latest"` and a missing value are `Latest`; integers are
    /// heights; other strings are hashes.
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => Some(BlockTag::Latest),
            Some(Value::String(s)) if s == "latest" => Some(BlockTag::Latest),
            Some(Value::String(s)) => Some(BlockTag::Hash(s.clone())),
            Some(Value::Number(n)) => n.as_u64().map(BlockTag::Height),
            Some(_) => None,
        }
    }
}

impl From<u64> for BlockTag {
    fn from(height: u64) -> Self {
        Self::Height(height)
    }
}

impl From<&str> for BlockTag {
    fn from(tag: &str) -> Self {
        if tag == "latest" {
            Self::Latest
        } else {
            Self::Hash(tag.to_string())
        }
    }
}

impl From<BlockId> for BlockTag {
    fn from(id: BlockId) -> Self {
        match id {
            BlockId::Height(h) => Self::Height(h),
            BlockId::Hash(h) => Self::Hash(h),
        }
    }
}

/// Either `finality` or `block_id`, never both.
///
/// Flattened into request parameter structs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockSelector {
    Finality { finality: Finality },
    BlockId { block_id: BlockId },
}

impl From<&BlockTag> for BlockSelector {
    fn from(tag: &BlockTag) -> Self {
        tag.selector()
    }
}
