//! The NEAR JSON-RPC provider.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use super::base::{DebugAction, DebugEvent, DebugListener, DefaultBase, ProviderBase};
use super::cache::{CacheKeying, ResponseCache};
use super::codec::{self, RequestIds, RpcRequest, RpcResponse};
use super::detect::detect_network;
use super::params::{self, BlockQuery, ChunkQuery, Query, QueryRequest};
use super::transaction::TransactionResponse;
use crate::error::{Error, NetworkError};
use crate::types::network::{self, resolve};
use crate::types::{
    AccessKeyListView, AccessKeyView, Address, BlockId, BlockTag, BlockView, CallResult,
    ChunkView, DEFAULT_URL, EndpointPair, FinalExecutionOutcome, Finality, NEAR_MAINNET,
    NEAR_TESTNET, NearToken, NetworkDescriptor, Networkish, SignedTransaction, StatusResponse,
    ViewStateResult,
};

const GET_BLOCK_UNSUPPORTED: &str = "getBlock function is not supported in Near Provider. Please use getBlockWithChunk function";

/// Readiness of a provider.
#[derive(Clone, Debug)]
pub enum ReadyState {
    /// Network detection has not finished.
    Detecting,
    /// The provider is connected to this network.
    Ready(NetworkDescriptor),
    /// Detection failed; the provider will never become ready.
    Failed(NetworkError),
}

struct Inner {
    network: Option<NetworkDescriptor>,
    endpoints: EndpointPair,
    http: reqwest::Client,
    timeout: Option<Duration>,
    ids: RequestIds,
    cache: ResponseCache,
    base: Arc<dyn ProviderBase>,
    listeners: Vec<DebugListener>,
    ready: OnceCell<Result<NetworkDescriptor, NetworkError>>,
}

/// JSON-RPC provider for a NEAR network.
///
/// Requests go to the primary endpoint. When the primary reports that it
/// pruned the requested block or transaction, the identical request is
/// re-sent once to the archival endpoint.
///
/// Every capability accessor waits for network detection first.
///
/// # Example
///
/// ```rust,no_run
/// use near_rpc_provider::{BlockTag, NearRpcProvider};
///
/// # async fn example() -> Result<(), near_rpc_provider::Error> {
/// let provider = NearRpcProvider::new("near-testnet")?;
/// let balance = provider.get_balance("alice.testnet", BlockTag::Latest).await?;
/// println!("{balance}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NearRpcProvider {
    inner: Arc<Inner>,
}

impl NearRpcProvider {
    /// Provider for a registered network with default settings.
    pub fn new(network: impl Into<Networkish>) -> Result<Self, Error> {
        Self::builder(network).build()
    }

    /// Configure a provider for a network.
    pub fn builder(network: impl Into<Networkish>) -> ProviderBuilder {
        ProviderBuilder::new(Some(network.into()))
    }

    /// Configure a mainnet provider.
    pub fn mainnet() -> ProviderBuilder {
        Self::builder(NEAR_MAINNET)
    }

    /// Configure a testnet provider.
    pub fn testnet() -> ProviderBuilder {
        Self::builder(NEAR_TESTNET)
    }

    /// URL of a locally running node.
    pub fn default_url() -> &'static str {
        DEFAULT_URL
    }

    /// Network the provider was configured for, if any.
    pub fn network(&self) -> Option<&NetworkDescriptor> {
        self.inner.network.as_ref()
    }

    pub fn endpoints(&self) -> &EndpointPair {
        &self.inner.endpoints
    }

    /// Next request id.
    pub fn next_id(&self) -> u64 {
        self.inner.ids.next_id()
    }

    // ========================================================================
    // Readiness
    // ========================================================================

    /// Detect the connected network, once.
    ///
    /// Concurrent callers wait for the same detection; its outcome, success or
    /// failure, is final.
    pub async fn ready(&self) -> Result<NetworkDescriptor, Error> {
        self.inner
            .ready
            .get_or_init(|| {
                detect_network(
                    |method| self.send(method, Value::Object(Map::new())),
                    self.inner.network.as_ref(),
                )
            })
            .await
            .clone()
            .map_err(Error::Network)
    }

    /// Current readiness without waiting.
    pub fn state(&self) -> ReadyState {
        match self.inner.ready.get() {
            None => ReadyState::Detecting,
            Some(Ok(network)) => ReadyState::Ready(network.clone()),
            Some(Err(err)) => ReadyState::Failed(err.clone()),
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Send one JSON-RPC request and return its decoded result.
    ///
    /// Responses to `status`, `EXPERIMENTAL_genesis_config` and `block` are
    /// reused for the rest of the current scheduler turn.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value, Error> {
        let request = codec::encode(method, params, self.next_id());
        self.emit(&DebugEvent::request(&request));

        if let Some(hit) = self.inner.cache.get(method, &request.params) {
            tracing::debug!(method, id = request.id, "served from cache");
            return Ok(hit);
        }

        let result = self.post(&self.inner.endpoints.primary, &request).await;
        self.emit(&DebugEvent::finished(DebugAction::Response, &request, &result));

        match result {
            Ok(value) => {
                self.inner.cache.store(method, &request.params, value.clone());
                Ok(value)
            }
            Err(err) if err.is_archival_retryable() => self.send_archival(&request, err).await,
            Err(err) => Err(err),
        }
    }

    async fn send_archival(&self, request: &RpcRequest, primary: Error) -> Result<Value, Error> {
        let url = match self.inner.endpoints.archival() {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(method = %request.method, error = %primary, "no archival endpoint for fallback");
                return Err(err.caused_by(primary));
            }
        };

        tracing::debug!(method = %request.method, id = request.id, cause = ?primary.as_rpc().and_then(|e| e.cause_name()), "retrying on archival endpoint");
        let result = self.post(url, request).await;
        self.emit(&DebugEvent::finished(DebugAction::ResponseArchival, request, &result));

        let value = result?;
        self.inner
            .cache
            .store(&request.method, &request.params, value.clone());
        Ok(value)
    }

    async fn post(&self, url: &str, request: &RpcRequest) -> Result<Value, Error> {
        let mut builder = self.inner.http.post(url).json(request);
        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Some nodes pair an error envelope with a non-2xx status.
            if let Ok(envelope) = serde_json::from_str::<RpcResponse>(&body) {
                if envelope.error.is_some() {
                    return codec::decode(envelope);
                }
            }
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        codec::decode_body(&body)
    }

    fn emit(&self, event: &DebugEvent<'_>) {
        let method = event.request.method.as_str();
        let id = event.request.id;
        match event.error() {
            Some(err) => tracing::debug!(action = %event.action, method, id, error = %err, "rpc"),
            None => tracing::debug!(action = %event.action, method, id, "rpc"),
        }

        self.inner.base.emit(event);
        for listener in &self.inner.listeners {
            listener(event);
        }
    }

    // ========================================================================
    // Capability dispatch
    // ========================================================================

    /// Run a named provider capability.
    ///
    /// `getBlockNumber`, `getBalance`, `getGasPrice` and `getBlockWithChunk`
    /// are answered here; `getBlock` is rejected; anything else goes to the
    /// provider base.
    pub async fn perform(&self, method: &str, params: &Value) -> Result<Value, Error> {
        match method {
            "getBlockNumber" => Ok(Value::from(self.get_block_number().await?)),
            "getBalance" => {
                let address = params
                    .get("address")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::invalid_argument("address", "missing address", None))?;
                let tag = BlockTag::from_value(params.get("blockTag")).ok_or_else(|| {
                    Error::invalid_argument(
                        "blockTag",
                        "invalid block tag",
                        params.get("blockTag").map(ToString::to_string),
                    )
                })?;
                let balance = self.get_balance(address, tag).await?;
                Ok(Value::String(balance.as_yoctonear().to_string()))
            }
            "getGasPrice" => Ok(Value::String(self.get_gas_price().await?.to_string())),
            "getBlockWithChunk" => {
                let block = self.get_block_with_chunk(block_query_from(params)?).await?;
                Ok(serde_json::to_value(block)?)
            }
            "getBlock" => Err(Error::unsupported("getBlock", GET_BLOCK_UNSUPPORTED)),
            _ => self.inner.base.perform(method, params).await,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Node status.
    pub async fn status(&self) -> Result<StatusResponse, Error> {
        self.ready().await?;
        let params = Value::Object(Map::new());
        let result = self.send("status", params.clone()).await?;
        parse("status", params, result)
    }

    /// The node's genesis configuration.
    pub async fn genesis_config(&self) -> Result<Value, Error> {
        self.ready().await?;
        self.send("EXPERIMENTAL_genesis_config", Value::Object(Map::new()))
            .await
    }

    /// Height of the most recent final block.
    pub async fn get_block_number(&self) -> Result<u64, Error> {
        self.ready().await?;
        let params = params::final_block();
        let result = self.send("block", params.clone()).await?;
        result
            .pointer("/header/height")
            .and_then(Value::as_u64)
            .ok_or_else(|| bad_result("getBlockNumber", params, Some(result.clone()), None))
    }

    /// Gas price of the latest block, in yoctoNEAR.
    pub async fn get_gas_price(&self) -> Result<u128, Error> {
        self.ready().await?;
        let params = params::latest_gas_price();
        let result = self.send("gas_price", params.clone()).await?;
        amount_field(&result, "gas_price")
            .ok_or_else(|| bad_result("getGasPrice", params, Some(result.clone()), None))
    }

    /// Account balance.
    pub async fn get_balance(
        &self,
        address: impl Into<Address>,
        block_tag: impl Into<BlockTag>,
    ) -> Result<NearToken, Error> {
        let params = self
            .query_params(address.into(), block_tag.into(), |account_id| {
                QueryRequest::ViewAccount { account_id }
            })
            .await?;
        let result = self.send("query", params.clone()).await?;
        amount_field(&result, "amount")
            .map(NearToken::from_yoctonear)
            .ok_or_else(|| bad_result("getBalance", params, Some(result.clone()), None))
    }

    /// Deployed contract code, base64 encoded.
    pub async fn get_code(
        &self,
        address: impl Into<Address>,
        block_tag: impl Into<BlockTag>,
    ) -> Result<String, Error> {
        let params = self
            .query_params(address.into(), block_tag.into(), |account_id| {
                QueryRequest::ViewCode { account_id }
            })
            .await?;
        let result = match self.send("query", params.clone()).await {
            Ok(result) => result,
            Err(err) => return Err(bad_result("getCode", params, None, Some(err))),
        };
        match result.get("code_base64").and_then(Value::as_str) {
            Some(code) => Ok(code.to_string()),
            None => Err(bad_result("getCode", params, Some(result.clone()), None)),
        }
    }

    /// Contract storage entries whose keys start with `prefix`.
    pub async fn get_contract_state(
        &self,
        address: impl Into<Address>,
        prefix: &[u8],
        block_tag: impl Into<BlockTag>,
    ) -> Result<ViewStateResult, Error> {
        let prefix_base64 = STANDARD.encode(prefix);
        let params = self
            .query_params(address.into(), block_tag.into(), |account_id| {
                QueryRequest::ViewState {
                    account_id,
                    prefix_base64,
                }
            })
            .await?;
        let result = self.send("query", params.clone()).await?;
        parse("getContractState", params, result)
    }

    /// All access keys of an account.
    pub async fn get_access_key_list(
        &self,
        address: impl Into<Address>,
        block_tag: impl Into<BlockTag>,
    ) -> Result<AccessKeyListView, Error> {
        let params = self
            .query_params(address.into(), block_tag.into(), |account_id| {
                QueryRequest::ViewAccessKeyList { account_id }
            })
            .await?;
        let result = self.send("query", params.clone()).await?;
        parse("getAccessKeyList", params, result)
    }

    /// One access key of an account.
    pub async fn get_access_key(
        &self,
        address: impl Into<Address>,
        public_key: impl Into<String>,
        block_tag: impl Into<BlockTag>,
    ) -> Result<AccessKeyView, Error> {
        let public_key = public_key.into();
        let params = self
            .query_params(address.into(), block_tag.into(), |account_id| {
                QueryRequest::ViewAccessKey {
                    account_id,
                    public_key,
                }
            })
            .await?;
        let result = self.send("query", params.clone()).await?;
        parse("getAccessKey", params, result)
    }

    /// Call a view function; `args` are passed to the contract verbatim.
    pub async fn call_function(
        &self,
        contract: impl Into<Address>,
        method_name: impl Into<String>,
        args: &[u8],
        block_tag: impl Into<BlockTag>,
    ) -> Result<CallResult, Error> {
        let method_name = method_name.into();
        let args_base64 = STANDARD.encode(args);
        let params = self
            .query_params(contract.into(), block_tag.into(), |account_id| {
                QueryRequest::CallFunction {
                    account_id,
                    method_name,
                    args_base64,
                }
            })
            .await?;
        let result = self.send("query", params.clone()).await?;
        parse("callFunction", params, result)
    }

    /// Peer and network information of the node.
    pub async fn get_network_info(&self) -> Result<Value, Error> {
        self.ready().await?;
        self.send("network_info", Value::Array(Vec::new())).await
    }

    /// Validators of the epoch containing `block_id`, or of the latest epoch.
    pub async fn get_validator_status(&self, block_id: Option<BlockId>) -> Result<Value, Error> {
        self.ready().await?;
        self.send("validators", params::validators(block_id.as_ref())?)
            .await
    }

    /// A block with its chunk headers.
    pub async fn get_block_with_chunk(&self, query: BlockQuery) -> Result<BlockView, Error> {
        self.ready().await?;
        let params = query.to_value()?;
        // Never sent, not even to the cache
        if query.is_empty() {
            return Err(bad_result("getBlockWithChunk", params, None, None));
        }
        let result = match self.send("block", params.clone()).await {
            Ok(result) => result,
            Err(err) => return Err(bad_result("getBlockWithChunk", params, None, Some(err))),
        };
        parse("getBlockWithChunk", params, result)
    }

    /// A chunk by hash or by block and shard.
    pub async fn get_chunk_details(&self, query: ChunkQuery) -> Result<ChunkView, Error> {
        self.ready().await?;
        let params = query.to_value()?;
        let result = match self.send("chunk", params.clone()).await {
            Ok(result) => result,
            Err(err) => return Err(bad_result("getChunkDetails", params, None, Some(err))),
        };
        parse("getChunkDetails", params, result)
    }

    /// Execution outcome of a transaction.
    pub async fn get_transaction_status(
        &self,
        tx_hash: &str,
        sender: impl Into<Address>,
    ) -> Result<FinalExecutionOutcome, Error> {
        self.ready().await?;
        let sender = sender.into().resolve().await?;
        let params = params::tx_status(tx_hash, &sender);
        let result = self.send("tx", params.clone()).await?;
        parse("getTransactionStatus", params, result)
    }

    /// Submit a signed, base64 encoded transaction without waiting for inclusion.
    pub async fn send_transaction(
        &self,
        signed_transaction: &str,
    ) -> Result<TransactionResponse, Error> {
        let network = self.ready().await?;
        let signed = SignedTransaction::from_base64(signed_transaction)?;

        let params = params::broadcast(signed_transaction);
        let result = self.send("broadcast_tx_async", params.clone()).await?;
        let hash = match result.as_str() {
            Some(hash) => hash.to_string(),
            None => return Err(bad_result("sendTransaction", params, Some(result.clone()), None)),
        };

        let block_number = self.get_block_number().await?;
        tracing::debug!(hash = %hash, block_number, "transaction broadcast");
        Ok(TransactionResponse::new(
            self.clone(),
            hash,
            signed.transaction,
            network.chain_id,
            block_number,
        ))
    }

    async fn query_params(
        &self,
        address: Address,
        block_tag: BlockTag,
        request: impl FnOnce(String) -> QueryRequest,
    ) -> Result<Value, Error> {
        self.ready().await?;
        let account_id = address.resolve().await?;
        Query::new(request(account_id), &block_tag).to_value()
    }
}

impl std::fmt::Debug for NearRpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearRpcProvider")
            .field("network", &self.inner.network)
            .field("endpoints", &self.inner.endpoints)
            .field("state", &self.state())
            .finish()
    }
}

fn bad_result(
    method: &'static str,
    params: Value,
    result: Option<Value>,
    source: Option<Error>,
) -> Error {
    Error::BadResult {
        method,
        params,
        result,
        source: source.map(Box::new),
    }
}

fn parse<T: DeserializeOwned>(method: &'static str, params: Value, result: Value) -> Result<T, Error> {
    serde_json::from_value(result.clone())
        .map_err(|err| bad_result(method, params, Some(result), Some(err.into())))
}

/// A yoctoNEAR amount the node renders as a decimal string.
fn amount_field(result: &Value, field: &str) -> Option<u128> {
    result.get(field)?.as_str()?.parse().ok()
}

fn block_query_from(params: &Value) -> Result<BlockQuery, Error> {
    let finality = params
        .get("finality")
        .map(|v| serde_json::from_value::<Finality>(v.clone()))
        .transpose()
        .map_err(|_| {
            Error::invalid_argument("finality", "invalid finality", params.get("finality").map(ToString::to_string))
        })?;
    let block_id = params
        .get("block_id")
        .map(|v| serde_json::from_value::<BlockId>(v.clone()))
        .transpose()
        .map_err(|_| {
            Error::invalid_argument("block_id", "invalid block id", params.get("block_id").map(ToString::to_string))
        })?;
    Ok(BlockQuery { finality, block_id })
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`NearRpcProvider`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use near_rpc_provider::{CacheKeying, NearRpcProvider};
///
/// # fn example() -> Result<(), near_rpc_provider::Error> {
/// let provider = NearRpcProvider::testnet()
///     .timeout(Duration::from_secs(10))
///     .cache_keying(CacheKeying::MethodAndParams)
///     .on_debug(|event| println!("{} {}", event.action, event.request.method))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ProviderBuilder {
    network: Option<Networkish>,
    rpc_url: Option<String>,
    archival_url: Option<String>,
    timeout: Option<Duration>,
    cache_keying: CacheKeying,
    base: Arc<dyn ProviderBase>,
    listeners: Vec<DebugListener>,
    http_client: Option<reqwest::Client>,
}

impl ProviderBuilder {
    fn new(network: Option<Networkish>) -> Self {
        Self {
            network,
            rpc_url: None,
            archival_url: None,
            timeout: None,
            cache_keying: CacheKeying::default(),
            base: Arc::new(DefaultBase),
            listeners: Vec::new(),
            http_client: None,
        }
    }

    /// A provider for an endpoint whose network is learned by detection.
    pub fn custom(rpc_url: impl Into<String>) -> Self {
        Self::new(None).rpc_url(rpc_url)
    }

    /// Override the primary endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Set or override the archival endpoint.
    pub fn archival_url(mut self, url: impl Into<String>) -> Self {
        self.archival_url = Some(url.into());
        self
    }

    /// Deadline for each HTTP round trip. Requests have no deadline by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache_keying(mut self, keying: CacheKeying) -> Self {
        self.cache_keying = keying;
        self
    }

    /// Provider base receiving unknown `perform` calls and debug events.
    pub fn base(mut self, base: Arc<dyn ProviderBase>) -> Self {
        self.base = base;
        self
    }

    /// Observe every round trip phase.
    pub fn on_debug(mut self, listener: impl Fn(&DebugEvent<'_>) + Send + Sync + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Resolve the network and endpoints and build the provider.
    ///
    /// Fails for network specifiers that resolve to no registered network,
    /// unless an explicit RPC URL was given.
    pub fn build(self) -> Result<NearRpcProvider, Error> {
        let network = match &self.network {
            Some(spec) => Some(resolve(Some(spec))?.ok_or_else(|| {
                Error::invalid_argument("network", "unsupported network", Some(describe(spec)))
            })?),
            None => None,
        };

        let registered = network
            .as_ref()
            .and_then(|n| EndpointPair::for_network(n).ok());

        let primary = match (self.rpc_url, &registered) {
            (Some(url), _) => url,
            (None, Some(pair)) => pair.primary.clone(),
            (None, None) => network::base_url(network.as_ref())?.to_string(),
        };
        let archival = self
            .archival_url
            .or_else(|| registered.and_then(|pair| pair.archival));

        tracing::debug!(primary = %primary, archival = ?archival, "provider configured");

        Ok(NearRpcProvider {
            inner: Arc::new(Inner {
                network,
                endpoints: EndpointPair::new(primary, archival),
                http: self.http_client.unwrap_or_default(),
                timeout: self.timeout,
                ids: RequestIds::new(),
                cache: ResponseCache::new(self.cache_keying),
                base: self.base,
                listeners: self.listeners,
                ready: OnceCell::new(),
            }),
        })
    }
}

impl std::fmt::Debug for ProviderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("archival_url", &self.archival_url)
            .field("timeout", &self.timeout)
            .field("cache_keying", &self.cache_keying)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn describe(spec: &Networkish) -> String {
    match spec {
        Networkish::ChainId(id) => id.to_string(),
        Networkish::Name(name) => name.clone(),
        Networkish::Descriptor(d) => d.to_string(),
    }
}
