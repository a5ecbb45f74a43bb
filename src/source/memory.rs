//! In-memory chain source backed by a JSON snapshot
//!
//! Snapshot format:
//!
//! ```json
//! {
//!   "blocks": [{ "hash": "...", "time": 1396317700, "txids": ["..."] }],
//!   "transactions": [{ "txid": "...", "inputs": [...], "outputs": [...], "block_time": 1396317700 }]
//! }
//! ```

use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::source::ChainSource;
use crate::types::{BlockInfo, TimeWindow, Transaction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialisable chain contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainSnapshot {
    #[serde(default)]
    pub blocks: Vec<BlockInfo>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Chain source answering from memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryChainSource {
    blocks: Vec<BlockInfo>,
    block_index: HashMap<String, usize>,
    transactions: HashMap<String, Transaction>,
}

impl InMemoryChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ChainSnapshot) -> Self {
        let mut source = Self::new();
        for block in snapshot.blocks {
            source.add_block(block);
        }
        for tx in snapshot.transactions {
            source.add_transaction(tx);
        }
        source
    }

    /// Load a snapshot written by `ChainSnapshot` serialisation
    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: ChainSnapshot = serde_json::from_str(&content).map_err(|e| {
            AppError::InvalidData(format!("Failed to parse snapshot {}: {}", path.display(), e))
        })?;
        debug!(
            "Loaded snapshot {} with {} blocks and {} transactions",
            path.display(),
            snapshot.blocks.len(),
            snapshot.transactions.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Add or replace a block
    pub fn add_block(&mut self, block: BlockInfo) {
        match self.block_index.get(&block.hash) {
            Some(&pos) => self.blocks[pos] = block,
            None => {
                self.block_index.insert(block.hash.clone(), self.blocks.len());
                self.blocks.push(block);
            }
        }
    }

    /// Add or replace a transaction
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(tx.txid.clone(), tx);
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

#[async_trait]
impl ChainSource for InMemoryChainSource {
    async fn block_hashes_in_range(&self, window: TimeWindow) -> SourceResult<Vec<String>> {
        let mut blocks: Vec<&BlockInfo> = self
            .blocks
            .iter()
            .filter(|block| window.contains(block.time))
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        blocks.sort_by_key(|block| block.time);
        Ok(blocks.into_iter().map(|block| block.hash.clone()).collect())
    }

    async fn block_info(&self, hash: &str) -> SourceResult<BlockInfo> {
        self.block_index
            .get(hash)
            .map(|&pos| self.blocks[pos].clone())
            .ok_or_else(|| SourceError::not_found(hash))
    }

    async fn transaction(&self, txid: &str) -> SourceResult<Transaction> {
        let tx = self
            .transactions
            .get(txid)
            .cloned()
            .ok_or_else(|| SourceError::not_found(txid))?;
        tx.validate()?;
        Ok(tx)
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}
