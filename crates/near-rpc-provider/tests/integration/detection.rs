//! Network detection against mock nodes.

use near_rpc_provider::*;
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn test_ready_detects_testnet() {
    let server = MockServer::start().await;
    testnet_status(&server).await;

    let provider = provider(&server);
    assert!(matches!(provider.state(), ReadyState::Detecting));

    let network = provider.ready().await.unwrap();
    assert_eq!(network, NEAR_TESTNET);
    assert_eq!(network.chain_id, 32762643847472500);
    assert!(matches!(provider.state(), ReadyState::Ready(n) if n == NEAR_TESTNET));
}

#[tokio::test]
async fn test_genesis_config_fallback() {
    let server = MockServer::start().await;
    on(&server, "status", ResponseTemplate::new(500)).await;
    on(
        &server,
        "EXPERIMENTAL_genesis_config",
        ok(json!({ "chain_id": "mainnet", "genesis_height": 9820210 })),
    )
    .await;

    let network = provider(&server).ready().await.unwrap();
    assert_eq!(network, NEAR_MAINNET);
    assert_eq!(calls(&server, "status").await.len(), 1);
    assert_eq!(calls(&server, "EXPERIMENTAL_genesis_config").await.len(), 1);
}

#[tokio::test]
async fn test_both_probes_fail() {
    let server = MockServer::start().await;
    on(&server, "status", rpc_error("INTERNAL_ERROR", "INTERNAL_ERROR")).await;
    on(
        &server,
        "EXPERIMENTAL_genesis_config",
        rpc_error("INTERNAL_ERROR", "INTERNAL_ERROR"),
    )
    .await;

    let provider = provider(&server);
    let err = match provider.ready().await.unwrap_err() {
        Error::Network(err) => err,
        other => panic!("unexpected error: {other:?}"),
    };
    assert_eq!(err.event, NetworkEvent::InvalidNetwork);
    assert_eq!(err.chain_id, None);
    assert!(err.server_error.as_deref().and_then(Error::as_rpc).is_some());
    assert!(matches!(provider.state(), ReadyState::Failed(_)));
}

#[tokio::test]
async fn test_failure_is_final() {
    let server = MockServer::start().await;
    on(&server, "status", ok(status_body("localnet"))).await;

    let provider = provider(&server);
    let first = provider.ready().await.unwrap_err();
    let second = provider.ready().await.unwrap_err();
    assert_eq!(first.to_string(), second.to_string());

    // Accessors surface the detection failure without new probes
    assert!(matches!(
        provider.get_block_number().await,
        Err(Error::Network(_))
    ));
    assert_eq!(calls(&server, "status").await.len(), 1);
    assert!(calls(&server, "block").await.is_empty());
}

#[tokio::test]
async fn test_unregistered_chain_id() {
    let server = MockServer::start().await;
    on(&server, "status", ok(status_body("localnet"))).await;

    match provider(&server).ready().await.unwrap_err() {
        Error::Network(err) => {
            assert_eq!(err.event, NetworkEvent::InvalidNetwork);
            assert_eq!(err.chain_id.as_deref(), Some("localnet"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_no_chain_id_reported() {
    let server = MockServer::start().await;
    on(&server, "status", ok(json!({ "version": { "version": "2.0.0" } }))).await;
    on(&server, "EXPERIMENTAL_genesis_config", ok(json!({}))).await;

    match provider(&server).ready().await.unwrap_err() {
        Error::Network(err) => assert_eq!(err.event, NetworkEvent::NoNetwork),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_configured_network_must_match_node() {
    let server = MockServer::start().await;
    on(&server, "status", ok(status_body("mainnet"))).await;

    let provider = NearRpcProvider::testnet()
        .rpc_url(server.uri())
        .build()
        .unwrap();
    match provider.ready().await.unwrap_err() {
        Error::Network(err) => {
            assert_eq!(err.event, NetworkEvent::InvalidNetwork);
            assert_eq!(err.chain_id.as_deref(), Some("mainnet"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_callers_share_one_detection() {
    let server = MockServer::start().await;
    testnet_status(&server).await;

    let provider = provider(&server);
    let other = provider.clone();
    let (a, b) = futures::join!(provider.ready(), other.ready());
    assert_eq!(a.unwrap(), NEAR_TESTNET);
    assert_eq!(b.unwrap(), NEAR_TESTNET);
    assert_eq!(calls(&server, "status").await.len(), 1);
}
