//! Capability accessors: parameter shapes and result decoding.

use futures::future::BoxFuture;
use near_rpc_provider::*;
use serde_json::{Value, json};
use wiremock::MockServer;

use crate::common::*;

const PUBLIC_KEY: &str = "ed25519:6zgh2u9DqHHiXzdy9ouTP7oGky2T4nugqzqt9wJZwNFm";

async fn node() -> MockServer {
    let server = MockServer::start().await;
    testnet_status(&server).await;
    server
}

async fn query_params(server: &MockServer) -> Value {
    let queries = calls(server, "query").await;
    assert_eq!(queries.len(), 1);
    queries[0]["params"].clone()
}

// =============================================================================
// Account queries
// =============================================================================

#[tokio::test]
async fn test_get_balance() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({
            "amount": "1000000000000000000000000",
            "locked": "0",
            "code_hash": "11111111111111111111111111111111",
            "storage_usage": 182,
            "block_height": 100,
            "block_hash": BLOCK_HASH
        })),
    )
    .await;

    let balance = provider(&server)
        .get_balance("alice.testnet", BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(balance, NearToken::from_near(1));
    assert_eq!(
        query_params(&server).await,
        json!({
            "request_type": "view_account",
            "account_id": "alice.testnet",
            "finality": "final"
        })
    );
}

#[tokio::test]
async fn test_get_balance_at_height() {
    let server = node().await;
    on(&server, "query", ok(json!({ "amount": "5", "block_height": 42 }))).await;

    let balance = provider(&server)
        .get_balance("alice.testnet", 42u64)
        .await
        .unwrap();
    assert_eq!(balance.as_yoctonear(), 5);
    assert_eq!(query_params(&server).await["block_id"], 42);
}

#[tokio::test]
async fn test_get_balance_bad_amount() {
    let server = node().await;
    on(&server, "query", ok(json!({ "amount": "lots" }))).await;

    let err = provider(&server)
        .get_balance("alice.testnet", BlockTag::Latest)
        .await
        .unwrap_err();
    match err {
        Error::BadResult {
            method, result, ..
        } => {
            assert_eq!(method, "getBalance");
            assert_eq!(result, Some(json!({ "amount": "lots" })));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_pending_address_is_resolved() {
    let server = node().await;
    on(&server, "query", ok(json!({ "amount": "7" }))).await;

    let address = Address::pending(async { Ok("lazy.testnet".to_string()) });
    provider(&server)
        .get_balance(address, BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(query_params(&server).await["account_id"], "lazy.testnet");
}

#[tokio::test]
async fn test_get_code() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({ "code_base64": "AGFzbQEAAAA=", "hash": BLOCK_HASH, "block_height": 1 })),
    )
    .await;

    let code = provider(&server)
        .get_code("app.testnet", BlockTag::Hash(BLOCK_HASH.to_string()))
        .await
        .unwrap();
    assert_eq!(code, "AGFzbQEAAAA=");
    assert_eq!(
        query_params(&server).await,
        json!({ "request_type": "view_code", "account_id": "app.testnet", "block_id": BLOCK_HASH })
    );
}

#[tokio::test]
async fn test_get_code_wraps_node_errors() {
    let server = node().await;
    on(&server, "query", handler_error("NO_CONTRACT_CODE")).await;

    let err = provider(&server)
        .get_code("alice.testnet", BlockTag::Latest)
        .await
        .unwrap_err();
    match err {
        Error::BadResult {
            method, source, ..
        } => {
            assert_eq!(method, "getCode");
            let source = source.expect("node error kept as source");
            assert_eq!(source.as_rpc().unwrap().cause_name(), Some("NO_CONTRACT_CODE"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_contract_state() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({
            "values": [{ "key": "U1RBVEU=", "value": "AQI=" }],
            "proof": [],
            "block_height": 100,
            "block_hash": BLOCK_HASH
        })),
    )
    .await;

    let state = provider(&server)
        .get_contract_state("app.testnet", b"STATE", BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(state.values.len(), 1);
    assert_eq!(state.values[0].value_bytes().unwrap(), vec![1, 2]);

    let params = query_params(&server).await;
    assert_eq!(params["request_type"], "view_state");
    assert_eq!(params["prefix_base64"], "U1RBVEU=");
}

#[tokio::test]
async fn test_get_access_keys() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({
            "keys": [{
                "public_key": PUBLIC_KEY,
                "access_key": { "nonce": 3, "permission": "FullAccess" }
            }],
            "block_height": 100,
            "block_hash": BLOCK_HASH
        })),
    )
    .await;

    let list = provider(&server)
        .get_access_key_list("alice.testnet", BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(list.keys.len(), 1);
    assert_eq!(list.keys[0].public_key.to_string(), PUBLIC_KEY);
    assert_eq!(list.keys[0].access_key.permission, AccessKeyPermissionView::FullAccess);
    assert_eq!(query_params(&server).await["request_type"], "view_access_key_list");
}

#[tokio::test]
async fn test_get_access_key() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({
            "nonce": 9,
            "permission": {
                "FunctionCall": {
                    "allowance": "250000000000000000000000",
                    "receiver_id": "app.testnet",
                    "method_names": []
                }
            },
            "block_height": 100,
            "block_hash": BLOCK_HASH
        })),
    )
    .await;

    let key = provider(&server)
        .get_access_key("alice.testnet", PUBLIC_KEY, BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(key.nonce, 9);
    assert!(matches!(
        key.permission,
        AccessKeyPermissionView::FunctionCall { allowance: Some(_), .. }
    ));

    let params = query_params(&server).await;
    assert_eq!(params["request_type"], "view_access_key");
    assert_eq!(params["public_key"], PUBLIC_KEY);
}

#[tokio::test]
async fn test_call_function() {
    let server = node().await;
    on(
        &server,
        "query",
        ok(json!({
            "result": br#"{"count":3}"#.to_vec(),
            "logs": ["read count"],
            "block_height": 100,
            "block_hash": BLOCK_HASH
        })),
    )
    .await;

    let result = provider(&server)
        .call_function("counter.testnet", "get_count", b"{}", BlockTag::Latest)
        .await
        .unwrap();
    assert_eq!(result.json::<Value>().unwrap()["count"], 3);
    assert_eq!(result.logs, vec!["read count"]);

    let params = query_params(&server).await;
    assert_eq!(params["request_type"], "call_function");
    assert_eq!(params["method_name"], "get_count");
    assert_eq!(params["args_base64"], "e30=");
}

// =============================================================================
// Blocks, chunks and node information
// =============================================================================

#[tokio::test]
async fn test_get_block_number_and_gas_price() {
    let server = node().await;
    on(&server, "block", ok(block_body(123))).await;
    on(&server, "gas_price", ok(json!({ "gas_price": "100000000" }))).await;

    let provider = provider(&server);
    assert_eq!(provider.get_block_number().await.unwrap(), 123);
    assert_eq!(provider.get_gas_price().await.unwrap(), 100_000_000);

    assert_eq!(calls(&server, "block").await[0]["params"], json!({ "finality": "final" }));
    assert_eq!(calls(&server, "gas_price").await[0]["params"], json!([null]));
}

#[tokio::test]
async fn test_get_block_with_chunk() {
    let server = node().await;
    on(&server, "block", ok(block_body(75370071))).await;

    let block = provider(&server)
        .get_block_with_chunk(BlockQuery::finality(Finality::Optimistic))
        .await
        .unwrap();
    assert_eq!(block.header.height, 75370071);
    assert_eq!(block.chunks[0].shard_id, 0);
    assert_eq!(
        calls(&server, "block").await[0]["params"],
        json!({ "finality": "optimistic" })
    );
}

#[tokio::test]
async fn test_get_block_with_chunk_wraps_errors() {
    let server = node().await;
    on(&server, "block", handler_error("NOT_SYNCED_YET")).await;

    let err = provider(&server)
        .get_block_with_chunk(BlockQuery::block_id(BLOCK_HASH))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BadResult {
            method: "getBlockWithChunk",
            source: Some(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_empty_block_query_after_cached_block() {
    let server = node().await;
    on(&server, "block", ok(block_body(100))).await;
    let provider = provider(&server);

    // Same turn: the head block is still cached under `block`
    assert_eq!(provider.get_block_number().await.unwrap(), 100);
    let err = provider
        .get_block_with_chunk(BlockQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::BadResult {
            method: "getBlockWithChunk",
            source: None,
            ..
        }
    ));
    assert_eq!(calls(&server, "block").await.len(), 1);
}

#[tokio::test]
async fn test_get_chunk_details() {
    let server = node().await;
    on(
        &server,
        "chunk",
        ok(json!({
            "author": "node1",
            "header": { "chunk_hash": BLOCK_HASH, "shard_id": 2, "height_included": 100 },
            "transactions": [],
            "receipts": []
        })),
    )
    .await;

    let provider = provider(&server);
    let chunk = provider
        .get_chunk_details(ChunkQuery::BlockShard {
            block_id: BlockId::Height(100),
            shard_id: 2,
        })
        .await
        .unwrap();
    assert_eq!(chunk.header.shard_id, 2);
    assert_eq!(
        calls(&server, "chunk").await[0]["params"],
        json!({ "block_id": 100, "shard_id": 2 })
    );
}

#[tokio::test]
async fn test_node_information() {
    let server = node().await;
    on(&server, "network_info", ok(json!({ "num_active_peers": 12 }))).await;
    on(&server, "validators", ok(json!({ "current_validators": [] }))).await;
    on(
        &server,
        "EXPERIMENTAL_genesis_config",
        ok(json!({ "chain_id": "testnet", "genesis_height": 42376888 })),
    )
    .await;

    let provider = provider(&server);
    assert_eq!(provider.get_network_info().await.unwrap()["num_active_peers"], 12);
    assert!(provider.get_validator_status(None).await.is_ok());
    provider
        .get_validator_status(Some(BlockId::Height(7)))
        .await
        .unwrap();
    assert_eq!(
        provider.genesis_config().await.unwrap()["genesis_height"],
        42376888
    );

    assert_eq!(calls(&server, "network_info").await[0]["params"], json!([]));
    let validators = calls(&server, "validators").await;
    assert_eq!(validators[0]["params"], json!([null]));
    assert_eq!(validators[1]["params"], json!([7]));
}

// =============================================================================
// perform
// =============================================================================

#[tokio::test]
async fn test_perform_known_capabilities() {
    let server = node().await;
    on(&server, "block", ok(block_body(300))).await;
    on(&server, "gas_price", ok(json!({ "gas_price": "100000000" }))).await;
    on(&server, "query", ok(json!({ "amount": "42" }))).await;

    let provider = provider(&server);
    assert_eq!(provider.perform("getBlockNumber", &json!({})).await.unwrap(), json!(300));
    assert_eq!(
        provider.perform("getGasPrice", &json!({})).await.unwrap(),
        json!("100000000")
    );
    assert_eq!(
        provider
            .perform(
                "getBalance",
                &json!({ "address": "alice.testnet", "blockTag": "latest" })
            )
            .await
            .unwrap(),
        json!("42")
    );

    let block = provider
        .perform("getBlockWithChunk", &json!({ "finality": "final" }))
        .await
        .unwrap();
    assert_eq!(block["header"]["height"], 300);
}

#[tokio::test]
async fn test_perform_get_balance_requires_address() {
    let server = node().await;
    let err = provider(&server)
        .perform("getBalance", &json!({ "blockTag": "latest" }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { argument: "address", .. }));
}

#[tokio::test]
async fn test_perform_delegates_unknown_methods_to_base() {
    struct Echo;

    impl ProviderBase for Echo {
        fn perform<'a>(
            &'a self,
            method: &'a str,
            params: &'a Value,
        ) -> BoxFuture<'a, Result<Value, Error>> {
            Box::pin(async move { Ok(json!({ "method": method, "params": params })) })
        }
    }

    let server = node().await;
    let provider = ProviderBuilder::custom(server.uri())
        .base(std::sync::Arc::new(Echo))
        .build()
        .unwrap();

    let answer = provider.perform("getStorageAt", &json!({ "slot": 1 })).await.unwrap();
    assert_eq!(answer, json!({ "method": "getStorageAt", "params": { "slot": 1 } }));

    // getBlock is rejected before the base is consulted
    assert!(matches!(
        provider.perform("getBlock", &json!({})).await,
        Err(Error::UnsupportedOperation { .. })
    ));
}
