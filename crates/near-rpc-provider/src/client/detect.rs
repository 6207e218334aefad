//! Network detection.
//!
//! The node is asked for its chain id through `status`, falling back to
//! `EXPERIMENTAL_genesis_config`. The chain id name is converted to its
//! numeric form and must name a registered network.

use std::future::Future;

use serde_json::Value;

use crate::error::{Error, NetworkError};
use crate::types::NetworkDescriptor;
use crate::types::network::{decode_chain_id, lookup_chain_id};

pub const STATUS_METHOD: &str = "status";
pub const GENESIS_CONFIG_METHOD: &str = "EXPERIMENTAL_genesis_config";

fn chain_id_of(result: &Value) -> Option<String> {
    result
        .get("chain_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Ask the node which chain it serves.
///
/// `send` issues one request with empty named params. When `expected` is
/// given, a registered but different network is rejected as well.
pub async fn detect_network<S, Fut>(
    send: S,
    expected: Option<&NetworkDescriptor>,
) -> Result<NetworkDescriptor, NetworkError>
where
    S: Fn(&'static str) -> Fut,
    Fut: Future<Output = Result<Value, Error>>,
{
    let from_status = match send(STATUS_METHOD).await {
        Ok(result) => chain_id_of(&result),
        Err(err) => {
            tracing::debug!(error = %err, "status probe failed, trying genesis config");
            None
        }
    };

    let chain_id = match from_status {
        Some(chain_id) => chain_id,
        None => match send(GENESIS_CONFIG_METHOD).await {
            Ok(result) => match chain_id_of(&result) {
                Some(chain_id) => chain_id,
                None => {
                    tracing::warn!("node reported no chain id");
                    return Err(NetworkError::no_network());
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "could not detect network");
                return Err(NetworkError::invalid_network(None, Some(err)));
            }
        },
    };

    let network = resolve_chain_id(&chain_id, expected).map_err(|err| {
        tracing::warn!(chain_id = %chain_id, error = %err, "unusable chain id");
        NetworkError::invalid_network(Some(chain_id.clone()), Some(err))
    })?;

    tracing::debug!(network = %network.name, chain_id = network.chain_id, "detected network");
    Ok(network)
}

fn resolve_chain_id(
    chain_id: &str,
    expected: Option<&NetworkDescriptor>,
) -> Result<NetworkDescriptor, Error> {
    let numeric = decode_chain_id(chain_id).ok_or_else(|| {
        Error::InvalidResponse(format!("chain id {chain_id:?} does not fit in 64 bits"))
    })?;

    let network = lookup_chain_id(numeric).ok_or_else(|| {
        Error::invalid_argument(
            "chainId",
            format!("Invalid network chainId {chain_id}"),
            Some(numeric.to_string()),
        )
    })?;

    if let Some(expected) = expected {
        if expected.chain_id != network.chain_id {
            return Err(Error::invalid_argument(
                "chainId",
                format!("connected to {}, expected {}", network.name, expected.name),
                Some(chain_id.to_string()),
            ));
        }
    }

    Ok(network)
}
