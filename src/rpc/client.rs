use crate::config::BitcoinRpcConfig;
use crate::detection::ShuffleClassifier;
use crate::errors::{RpcError, RpcResult, SourceError, SourceResult};
use crate::rpc::headers::{block_hashes_in_window, HeaderLookup};
use crate::rpc::types::{RawBlock, RawBlockHeader, RawTransaction};
use crate::rpc::{run_blocking, CacheStats, TransactionCache};
use crate::source::ChainSource;
use crate::types::{BlockInfo, TimeWindow, Transaction};
use crate::utils::currency::btc_to_sats;
use async_trait::async_trait;
use corepc_client::client_sync::{v28::Client, Auth};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, info, warn};

/// RPC request types for the async worker pattern
#[derive(Debug)]
pub enum RpcRequest {
    GetBlockCount {
        tx: oneshot::Sender<RpcResult<u64>>,
    },
    GetBlockHash {
        height: u64,
        tx: oneshot::Sender<RpcResult<String>>,
    },
    GetBlockHeader {
        hash: String,
        tx: oneshot::Sender<RpcResult<RawBlockHeader>>,
    },
    GetBlock {
        hash: String,
        tx: oneshot::Sender<RpcResult<RawBlock>>,
    },
    GetTransaction {
        txid: String,
        tx: oneshot::Sender<RpcResult<RawTransaction>>,
    },
    TestConnection {
        tx: oneshot::Sender<RpcResult<()>>,
    },
}

/// Bitcoin RPC client with an async worker and bounded request concurrency
pub struct BitcoinRpcClient {
    request_tx: mpsc::Sender<RpcRequest>,
    error_count: Arc<AtomicU64>,
    cache: TransactionCache,
    concurrent_requests: usize,
    shape_filter: Option<ShuffleClassifier>,
}

impl BitcoinRpcClient {
    /// Create a new RPC client and spawn the worker task
    pub async fn new(config: BitcoinRpcConfig) -> RpcResult<Self> {
        let (request_tx, request_rx) = mpsc::channel(100);
        let error_count = Arc::new(AtomicU64::new(0));

        // Test connection before starting worker
        let client = Self::create_sync_client(&config)?;
        run_blocking(config.timeout_seconds, "connection_test", {
            let client = Arc::clone(&client);
            move || -> RpcResult<()> {
                call_json::<Value>(&client, "getblockchaininfo", &[]).map_err(|e| {
                    RpcError::ConnectionFailed(format!(
                        "Failed to connect to Bitcoin RPC - check URL, credentials, and that Bitcoin Core is running: {}",
                        e
                    ))
                })?;
                Ok(())
            }
        })
        .await?;

        info!("Bitcoin RPC connection established successfully");

        let cache = TransactionCache::new(config.cache_capacity);

        let concurrent_requests = config.concurrent_requests.max(1);
        let worker = RpcWorker::new(config, client, Arc::clone(&error_count), cache.clone());
        tokio::spawn(worker.run(request_rx));

        Ok(Self {
            request_tx,
            error_count,
            cache,
            concurrent_requests,
            shape_filter: None,
        })
    }

    /// Only resolve input values for transactions that pass `classifier`'s
    /// participant and shape gates; the rest keep unresolved inputs
    pub fn with_shape_filter(mut self, classifier: ShuffleClassifier) -> Self {
        self.shape_filter = Some(classifier);
        self
    }

    async fn send<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<RpcResult<T>>) -> RpcRequest,
    ) -> RpcResult<T> {
        let (tx, rx) = oneshot::channel();

        self.request_tx
            .send(build(tx))
            .await
            .map_err(|_| RpcError::ConnectionFailed("Failed to send RPC request".to_string()))?;

        rx.await
            .map_err(|_| RpcError::ConnectionFailed("RPC worker channel closed".to_string()))?
    }

    /// Test RPC connection
    pub async fn test_connection(&self) -> RpcResult<()> {
        self.send(|tx| RpcRequest::TestConnection { tx }).await
    }

    /// Hashes of blocks whose header time falls inside `window`
    pub async fn get_block_hashes_in_range(&self, window: TimeWindow) -> RpcResult<Vec<String>> {
        block_hashes_in_window(self, window).await
    }

    pub async fn get_block_count(&self) -> RpcResult<u64> {
        self.send(|tx| RpcRequest::GetBlockCount { tx }).await
    }

    pub async fn get_block_hash(&self, height: u64) -> RpcResult<String> {
        self.send(|tx| RpcRequest::GetBlockHash { height, tx }).await
    }

    pub async fn get_block_header(&self, hash: &str) -> RpcResult<RawBlockHeader> {
        let hash = hash.to_string();
        self.send(|tx| RpcRequest::GetBlockHeader { hash, tx }).await
    }

    pub async fn get_block(&self, hash: &str) -> RpcResult<RawBlock> {
        let hash = hash.to_string();
        self.send(|tx| RpcRequest::GetBlock { hash, tx }).await
    }

    /// Get a verbose transaction, consulting the cache first
    pub async fn get_raw_transaction(&self, txid: &str) -> RpcResult<RawTransaction> {
        if let Some(cached_tx) = self.cache.get(txid) {
            return Ok(cached_tx);
        }

        let txid = txid.to_string();
        self.send(|tx| RpcRequest::GetTransaction { txid, tx }).await
    }

    /// Fetch a transaction and resolve each input's value from the output it spends.
    ///
    /// An input whose previous transaction cannot be fetched stays unresolved
    /// rather than failing the whole transaction.
    pub async fn get_resolved_transaction(&self, txid: &str) -> SourceResult<Transaction> {
        let raw = self
            .get_raw_transaction(txid)
            .await
            .map_err(|e| SourceError::from_rpc(txid, e))?;

        if !needs_input_values(self.shape_filter.as_ref(), &raw) {
            return raw.into_transaction(&[]);
        }

        let mut outpoints = Vec::with_capacity(raw.vin.len());
        for input in &raw.vin {
            outpoints.push(input.outpoint(&raw.txid)?.map(|(t, v)| (t.to_string(), v)));
        }

        let input_values: Vec<Option<u64>> = stream::iter(outpoints)
            .map(|outpoint| async move {
                let (prev_txid, prev_vout) = outpoint?;
                match self.get_raw_transaction(&prev_txid).await {
                    Ok(prev_tx) => {
                        let value = prev_tx.output_value(prev_vout).map(btc_to_sats);
                        if value.is_none() {
                            warn!(
                                "Input {}:{} of {} references a missing output",
                                prev_txid, prev_vout, txid
                            );
                        }
                        value
                    }
                    Err(e) => {
                        debug!(
                            "Failed to fetch previous tx {} for input resolution of {}: {}",
                            prev_txid, txid, e
                        );
                        None
                    }
                }
            })
            .buffered(self.concurrent_requests)
            .collect()
            .await;

        raw.into_transaction(&input_values)
    }

    /// Get the current error count from RPC operations
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Get cache statistics
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// Get the configured concurrent request limit
    pub fn get_concurrent_limit(&self) -> usize {
        self.concurrent_requests
    }

    /// Create synchronous client for worker use
    fn create_sync_client(config: &BitcoinRpcConfig) -> RpcResult<Arc<Client>> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create Bitcoin RPC client: {}", e))
        })?;

        Ok(Arc::new(client))
    }
}

#[async_trait]
impl HeaderLookup for BitcoinRpcClient {
    async fn tip_height(&self) -> RpcResult<u64> {
        self.get_block_count().await
    }

    async fn header_at_height(&self, height: u64) -> RpcResult<RawBlockHeader> {
        let hash = self.get_block_hash(height).await?;
        self.get_block_header(&hash).await
    }

    async fn header_by_hash(&self, hash: &str) -> RpcResult<RawBlockHeader> {
        self.get_block_header(hash).await
    }
}

#[async_trait]
impl ChainSource for BitcoinRpcClient {
    async fn block_hashes_in_range(&self, window: TimeWindow) -> SourceResult<Vec<String>> {
        self.get_block_hashes_in_range(window)
            .await
            .map_err(|e| SourceError::from_rpc(&window.to_string(), e))
    }

    async fn block_info(&self, hash: &str) -> SourceResult<BlockInfo> {
        let block = self
            .get_block(hash)
            .await
            .map_err(|e| SourceError::from_rpc(hash, e))?;
        Ok(BlockInfo {
            hash: block.hash,
            time: block.time,
            txids: block.tx,
        })
    }

    async fn transaction(&self, txid: &str) -> SourceResult<Transaction> {
        self.get_resolved_transaction(txid).await
    }

    fn source_name(&self) -> &'static str {
        "bitcoin-core"
    }
}

/// Issue a JSON-RPC call and deserialise the result.
///
/// Transport failures and "not found" replies are separated here because the
/// node reports both as generic call errors.
fn call_json<T: DeserializeOwned>(client: &Client, method: &str, args: &[Value]) -> RpcResult<T> {
    let value = client.call::<Value>(method, args).map_err(|e| {
        let message = e.to_string();
        if is_not_found_message(&message) {
            RpcError::NotFound {
                target: args.first().map(|a| a.to_string()).unwrap_or_default(),
            }
        } else {
            RpcError::CallFailed {
                method: method.to_string(),
                message,
            }
        }
    })?;

    serde_json::from_value(value).map_err(|e| {
        RpcError::DeserialisationFailed(format!("Unexpected {} response: {}", method, e))
    })
}

/// Whether a transaction's inputs are worth resolving under `filter`
fn needs_input_values(filter: Option<&ShuffleClassifier>, raw: &RawTransaction) -> bool {
    filter.map_or(true, |classifier| {
        classifier.has_candidate_shape(raw.vin.len(), raw.vout.len())
    })
}

fn is_not_found_message(message: &str) -> bool {
    message.contains("No such mempool or blockchain transaction")
        || message.contains("Invalid or non-wallet transaction id")
        || message.contains("Block not found")
        || message.contains("Block height out of range")
}

/// RPC worker that handles all Bitcoin Core communication in a dedicated task
#[derive(Clone)]
struct RpcWorker {
    client: Arc<Client>,
    config: BitcoinRpcConfig,
    semaphore: Arc<Semaphore>,
    error_count: Arc<AtomicU64>,
    cache: TransactionCache,
}

impl RpcWorker {
    fn new(
        config: BitcoinRpcConfig,
        client: Arc<Client>,
        error_count: Arc<AtomicU64>,
        cache: TransactionCache,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrent_requests.max(1)));
        Self {
            client,
            config,
            semaphore,
            error_count,
            cache,
        }
    }

    async fn run(self, mut request_rx: mpsc::Receiver<RpcRequest>) {
        info!(
            "RPC worker started with {} concurrent request limit",
            self.config.concurrent_requests
        );

        while let Some(request) = request_rx.recv().await {
            let worker = self.clone();

            // Each request gets its own task; the semaphore bounds calls in flight
            tokio::spawn(async move {
                worker.handle_request(request).await;
            });
        }

        info!("RPC worker shutting down");
    }

    async fn handle_request(&self, request: RpcRequest) {
        match request {
            RpcRequest::GetBlockCount { tx } => {
                let result = self
                    .call("getblockcount", |client| {
                        call_json(client, "getblockcount", &[])
                    })
                    .await;
                let _ = tx.send(result);
            }
            RpcRequest::GetBlockHash { height, tx } => {
                let operation = format!("getblockhash({})", height);
                let result = self
                    .call(&operation, move |client| {
                        call_json(client, "getblockhash", &[json!(height)])
                    })
                    .await;
                let _ = tx.send(result);
            }
            RpcRequest::GetBlockHeader { hash, tx } => {
                let operation = format!("getblockheader({})", hash);
                let result = self
                    .call(&operation, move |client| {
                        call_json(client, "getblockheader", &[json!(hash), json!(true)])
                    })
                    .await;
                let _ = tx.send(result);
            }
            RpcRequest::GetBlock { hash, tx } => {
                let operation = format!("getblock({})", hash);
                let result = self
                    .call(&operation, move |client| {
                        call_json(client, "getblock", &[json!(hash), json!(1)])
                    })
                    .await;
                let _ = tx.send(result);
            }
            RpcRequest::GetTransaction { txid, tx } => {
                let result = self.get_transaction(txid).await;
                let _ = tx.send(result);
            }
            RpcRequest::TestConnection { tx } => {
                let result = self
                    .call("connection_test", |client| {
                        let info: Value = call_json(client, "getblockchaininfo", &[])?;
                        debug!(
                            "Bitcoin Core connection test successful - chain: {}, blocks: {}",
                            info["chain"], info["blocks"]
                        );
                        Ok(())
                    })
                    .await;
                let _ = tx.send(result);
            }
        }
    }

    async fn get_transaction(&self, txid: String) -> RpcResult<RawTransaction> {
        let operation = format!("getrawtransaction({})", txid);
        let key = txid.clone();
        let transaction: RawTransaction = self
            .call(&operation, move |client| {
                call_json(client, "getrawtransaction", &[json!(txid), json!(true)])
            })
            .await?;
        self.cache.put(key, transaction.clone());
        Ok(transaction)
    }

    /// Run one blocking call under the semaphore and timeout; failures bump the error count
    async fn call<T, F>(&self, operation: &str, f: F) -> RpcResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> RpcResult<T> + Send + 'static,
    {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to acquire semaphore: {}", e))
        })?;

        let client = Arc::clone(&self.client);
        let result = run_blocking(self.config.timeout_seconds, operation, move || {
            f(client.as_ref())
        })
        .await;

        match &result {
            Ok(_) => {}
            Err(RpcError::NotFound { .. }) => {
                debug!("{} returned not found", operation);
            }
            Err(e) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
                warn!("RPC {} failed: {}", operation, e);
            }
        }
        result
    }
}
