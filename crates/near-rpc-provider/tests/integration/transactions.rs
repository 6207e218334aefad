//! Broadcasting signed transactions and waiting for their outcome.

use std::time::Duration;

use near_rpc_provider::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer};

use crate::common::*;

async fn node() -> MockServer {
    let server = MockServer::start().await;
    testnet_status(&server).await;
    on(&server, "block", ok(block_body(1000))).await;
    server
}

#[tokio::test]
async fn test_send_transaction() {
    let server = node().await;
    on(&server, "broadcast_tx_async", ok(json!(SIGNED_TRANSFER_HASH))).await;

    let response = provider(&server)
        .send_transaction(SIGNED_TRANSFER)
        .await
        .unwrap();
    assert_eq!(response.hash, SIGNED_TRANSFER_HASH);
    assert_eq!(response.from.as_str(), "sender.testnet");
    assert_eq!(response.to.as_str(), "receiver.testnet");
    assert_eq!(response.nonce, 15);
    assert_eq!(response.actions, vec![Action::transfer(NearToken::from_near(1))]);
    assert_eq!(response.chain_id, NEAR_TESTNET.chain_id);
    assert_eq!(response.block_number, 1000);
    assert_eq!(response.confirmations, 0);

    let broadcasts = calls(&server, "broadcast_tx_async").await;
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0]["params"], json!([SIGNED_TRANSFER]));
}

#[tokio::test]
async fn test_invalid_payload_is_not_broadcast() {
    let server = node().await;

    let err = provider(&server)
        .send_transaction("AAAA")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransaction(_)));
    assert!(calls(&server, "broadcast_tx_async").await.is_empty());
}

#[tokio::test]
async fn test_non_string_broadcast_result() {
    let server = node().await;
    on(&server, "broadcast_tx_async", ok(json!({ "hash": 1 }))).await;

    let err = provider(&server)
        .send_transaction(SIGNED_TRANSFER)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BadResult {
            method: "sendTransaction",
            ..
        }
    ));
}

#[tokio::test]
async fn test_wait_returns_receipt() {
    let server = node().await;
    on(&server, "broadcast_tx_async", ok(json!(SIGNED_TRANSFER_HASH))).await;
    on(&server, "tx", ok(outcome_body())).await;

    let response = provider(&server)
        .send_transaction(SIGNED_TRANSFER)
        .await
        .unwrap();
    let receipt = response.wait().await.unwrap();

    assert_eq!(receipt.transaction_hash, SIGNED_TRANSFER_HASH);
    assert_eq!(receipt.block_hash.to_string(), BLOCK_HASH);
    assert_eq!(receipt.block_number, 1000);
    assert_eq!(receipt.from.as_str(), "sender.testnet");
    assert_eq!(receipt.to.as_str(), "receiver.testnet");
    assert_eq!(receipt.confirmations, 2);
    assert_eq!(receipt.gas_used, NearGas::from_gas(223182562500));
    assert!(receipt.is_success());

    assert_eq!(
        calls(&server, "tx").await[0]["params"],
        json!([SIGNED_TRANSFER_HASH, "sender.testnet"])
    );
}

#[tokio::test]
async fn test_wait_with_retry_polls_until_known() {
    let server = node().await;
    on(&server, "broadcast_tx_async", ok(json!(SIGNED_TRANSFER_HASH))).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "tx" })))
        .respond_with(rpc_error("HANDLER_ERROR", "TIMEOUT_ERROR"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    on(&server, "tx", ok(outcome_body())).await;

    let response = provider(&server)
        .send_transaction(SIGNED_TRANSFER)
        .await
        .unwrap();

    assert!(response.wait().await.is_err());
    let receipt = response
        .wait_with_retry(3, Duration::from_millis(10))
        .await
        .unwrap();
    assert!(receipt.is_success());
    assert_eq!(calls(&server, "tx").await.len(), 3);
}

#[tokio::test]
async fn test_wait_with_retry_gives_up() {
    let server = node().await;
    on(&server, "broadcast_tx_async", ok(json!(SIGNED_TRANSFER_HASH))).await;
    on(&server, "tx", handler_error("TIMEOUT_ERROR")).await;

    let response = provider(&server)
        .send_transaction(SIGNED_TRANSFER)
        .await
        .unwrap();
    let err = response
        .wait_with_retry(2, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert_eq!(err.as_rpc().unwrap().cause_name(), Some("TIMEOUT_ERROR"));
    assert_eq!(calls(&server, "tx").await.len(), 3);
}
