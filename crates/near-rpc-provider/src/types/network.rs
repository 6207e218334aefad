//! Network registry for NEAR Protocol.
//!
//! Maps logical network names and numeric chain ids to canonical
//! [`NetworkDescriptor`]s and to the endpoints serving them. A NEAR chain id
//! is a short ASCII name (`"testnet"`); its numeric form is the big-endian
//! integer of those bytes, the same value produced by hex-encoding the name
//! and parsing it base 16.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// URL used when a provider is pointed at a local node.
pub const DEFAULT_URL: &str = "http://localhost:3030";

/// A canonical network identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// Logical network name, e.g. `near-testnet`.
    pub name: Cow<'static, str>,
    /// Numeric chain id derived from the node's chain id string.
    pub chain_id: u64,
}

impl NetworkDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<Cow<'static, str>>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
        }
    }

    /// Returns true if this descriptor was synthesized for an unregistered chain id.
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_NETWORK_NAME
    }
}

impl fmt::Display for NetworkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Name given to descriptors synthesized for unregistered chain ids.
pub const UNKNOWN_NETWORK_NAME: &str = "unknown";

/// NEAR mainnet.
pub const NEAR_MAINNET: NetworkDescriptor = NetworkDescriptor {
    name: Cow::Borrowed("near-mainnet"),
    chain_id: chain_id_from_name("mainnet"),
};

/// NEAR testnet.
pub const NEAR_TESTNET: NetworkDescriptor = NetworkDescriptor {
    name: Cow::Borrowed("near-testnet"),
    chain_id: chain_id_from_name("testnet"),
};

/// NEAR betanet.
pub const NEAR_BETANET: NetworkDescriptor = NetworkDescriptor {
    name: Cow::Borrowed("near-betanet"),
    chain_id: chain_id_from_name("betanet"),
};

struct NetworkEntry {
    descriptor: NetworkDescriptor,
    /// Short registry key also accepted by name lookups.
    alias: &'static str,
    rpc_url: &'static str,
    archival_url: Option<&'static str>,
}

const NETWORKS: &[NetworkEntry] = &[
    NetworkEntry {
        descriptor: NEAR_MAINNET,
        alias: "near",
        rpc_url: "https://rpc.mainnet.near.org",
        archival_url: Some("https://archival-rpc.mainnet.near.org"),
    },
    NetworkEntry {
        descriptor: NEAR_TESTNET,
        alias: "neartestnet",
        rpc_url: "https://rpc.testnet.near.org",
        archival_url: Some("https://archival-rpc.testnet.near.org"),
    },
    NetworkEntry {
        descriptor: NEAR_BETANET,
        alias: "nearbetanet",
        rpc_url: "https://rpc.betanet.near.org",
        archival_url: None,
    },
];

/// Numeric chain id of a chain id name, computed at compile time.
///
/// Names longer than 8 bytes do not fit and fail const evaluation.
pub const fn chain_id_from_name(name: &str) -> u64 {
    let bytes = name.as_bytes();
    assert!(!bytes.is_empty() && bytes.len() <= 8, "chain id name must be 1..=8 bytes");
    let mut value = 0u64;
    let mut i = 0;
    while i < bytes.len() {
        value = (value << 8) | bytes[i] as u64;
        i += 1;
    }
    value
}

/// Decode a chain id string reported by a node into its numeric form.
///
/// Returns `None` for empty ids and ids longer than 8 bytes.
pub fn decode_chain_id(chain_id: &str) -> Option<u64> {
    if chain_id.is_empty() || chain_id.len() > 8 {
        return None;
    }
    u64::from_str_radix(&hex::encode(chain_id), 16).ok()
}

/// A loosely-typed network specifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Networkish {
    /// Numeric chain id.
    ChainId(u64),
    /// Logical network name.
    Name(String),
    /// A descriptor whose name and chain id must both match the registry.
    Descriptor(NetworkDescriptor),
}

impl From<u64> for Networkish {
    fn from(chain_id: u64) -> Self {
        Self::ChainId(chain_id)
    }
}

impl From<&str> for Networkish {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Networkish {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<NetworkDescriptor> for Networkish {
    fn from(descriptor: NetworkDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<&NetworkDescriptor> for Networkish {
    fn from(descriptor: &NetworkDescriptor) -> Self {
        Self::Descriptor(descriptor.clone())
    }
}

/// Resolve a network specifier against the registry.
///
/// - absent → `Ok(None)`
/// - chain id → the registered descriptor, or a synthesized `unknown` one
/// - name → the registered descriptor, or `Ok(None)`
/// - descriptor → the registered descriptor; an unknown name or a chain id
///   mismatch is an argument error
pub fn resolve(spec: Option<&Networkish>) -> Result<Option<NetworkDescriptor>, Error> {
    let Some(spec) = spec else {
        return Ok(None);
    };

    match spec {
        Networkish::ChainId(chain_id) => Ok(Some(
            lookup_chain_id(*chain_id)
                .unwrap_or_else(|| NetworkDescriptor::new(UNKNOWN_NETWORK_NAME, *chain_id)),
        )),
        Networkish::Name(name) => Ok(lookup_name(name)),
        Networkish::Descriptor(descriptor) => {
            let Some(found) = lookup_name(&descriptor.name) else {
                return Err(Error::invalid_argument(
                    "network",
                    "invalid near network",
                    Some(descriptor.to_string()),
                ));
            };
            if found.chain_id != descriptor.chain_id {
                return Err(Error::invalid_argument(
                    "network",
                    format!(
                        "network chainId mismatch: expected {}, got {}",
                        found.chain_id, descriptor.chain_id
                    ),
                    Some(descriptor.to_string()),
                ));
            }
            Ok(Some(found))
        }
    }
}

/// Registered descriptor for a chain id.
pub fn lookup_chain_id(chain_id: u64) -> Option<NetworkDescriptor> {
    NETWORKS
        .iter()
        .find(|entry| entry.descriptor.chain_id == chain_id)
        .map(|entry| entry.descriptor.clone())
}

/// Registered descriptor for a network name or its short alias (`neartestnet`).
pub fn lookup_name(name: &str) -> Option<NetworkDescriptor> {
    NETWORKS
        .iter()
        .find(|entry| entry.descriptor.name == name || entry.alias == name)
        .map(|entry| entry.descriptor.clone())
}

/// All registered networks.
pub fn registered() -> impl Iterator<Item = &'static NetworkDescriptor> {
    NETWORKS.iter().map(|entry| &entry.descriptor)
}

fn find_entry(name: &str) -> Option<&'static NetworkEntry> {
    NETWORKS.iter().find(|entry| entry.descriptor.name == name)
}

fn registered_entry(network: Option<&NetworkDescriptor>) -> Result<&'static NetworkEntry, Error> {
    network
        .and_then(|n| find_entry(&n.name).filter(|e| e.descriptor.chain_id == n.chain_id))
        .ok_or_else(|| {
            Error::invalid_argument(
                "network",
                "unsupported network",
                network.map(ToString::to_string),
            )
        })
}

/// Primary RPC URL of a network.
pub fn base_url(network: Option<&NetworkDescriptor>) -> Result<&'static str, Error> {
    registered_entry(network).map(|entry| entry.rpc_url)
}

/// Archival RPC URL of a network.
///
/// Fails for unsupported networks and for networks without an archival node.
pub fn archival_url(network: Option<&NetworkDescriptor>) -> Result<&'static str, Error> {
    registered_entry(network)?.archival_url.ok_or_else(|| {
        Error::invalid_argument(
            "network",
            "network has no archival endpoint",
            network.map(ToString::to_string),
        )
    })
}

/// Endpoints a provider talks to, frozen at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointPair {
    /// Pruned node used for every request.
    pub primary: String,
    /// Archival node used when the primary lacks historical data.
    pub archival: Option<String>,
}

impl EndpointPair {
    /// Create an endpoint pair.
    pub fn new(primary: impl Into<String>, archival: Option<String>) -> Self {
        Self {
            primary: primary.into(),
            archival,
        }
    }

    /// Resolve the endpoints of a registered network.
    pub fn for_network(network: &NetworkDescriptor) -> Result<Self, Error> {
        let entry = registered_entry(Some(network))?;
        Ok(Self {
            primary: entry.rpc_url.to_string(),
            archival: entry.archival_url.map(str::to_string),
        })
    }

    /// The archival URL, or an argument error if none is configured.
    pub fn archival(&self) -> Result<&str, Error> {
        self.archival.as_deref().ok_or_else(|| {
            Error::invalid_argument(
                "archivalUrl",
                "no archival endpoint configured",
                Some(self.primary.clone()),
            )
        })
    }
}
