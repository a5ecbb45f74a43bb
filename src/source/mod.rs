//! Chain data sources
//!
//! The traversal only needs three lookups: block hashes for a time window, the
//! transaction ids of a block, and a transaction with its input values
//! resolved. Bindings:
//!
//! - **`rpc::BitcoinRpcClient`** - Bitcoin Core JSON-RPC
//! - **`InMemoryChainSource`** - JSON snapshot replay for offline runs and tests

pub mod memory;

pub use memory::{ChainSnapshot, InMemoryChainSource};

use crate::errors::SourceResult;
use crate::types::{BlockInfo, TimeWindow, Transaction};
use async_trait::async_trait;

/// Lookups the traversal issues against a chain index
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Hashes of blocks whose time falls inside `window`, in chain order.
    /// An empty result is valid.
    async fn block_hashes_in_range(&self, window: TimeWindow) -> SourceResult<Vec<String>>;

    /// Block detail, including the ids of its transactions
    async fn block_info(&self, hash: &str) -> SourceResult<BlockInfo>;

    /// Transaction detail with input values resolved where possible
    async fn transaction(&self, txid: &str) -> SourceResult<Transaction>;

    /// Short name for log lines
    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl<T: ChainSource + ?Sized> ChainSource for &T {
    async fn block_hashes_in_range(&self, window: TimeWindow) -> SourceResult<Vec<String>> {
        (**self).block_hashes_in_range(window).await
    }

    async fn block_info(&self, hash: &str) -> SourceResult<BlockInfo> {
        (**self).block_info(hash).await
    }

    async fn transaction(&self, txid: &str) -> SourceResult<Transaction> {
        (**self).transaction(txid).await
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}
