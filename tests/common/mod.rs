//! Common Test Utilities
//!
//! Shared fixtures for building transactions and blocks, a fault-injecting
//! source wrapper and a recording report sink.

#![allow(dead_code)]

pub mod rpc_helpers;

use async_trait::async_trait;
use coinshuffle_scan::errors::{AppResult, SourceError, SourceResult};
use coinshuffle_scan::report::ReportSink;
use coinshuffle_scan::source::ChainSource;
use coinshuffle_scan::types::{
    BlockInfo, ClassificationResult, TimeWindow, Transaction, TxInput, TxOutput,
};
use std::collections::HashSet;

/// Satoshi value of 1 BTC, for readable fixtures
pub const ONE_BTC: u64 = 100_000_000;

/// Build a transaction shaped like an N-party shuffle.
///
/// Each participant spends one input worth `input_sats` and receives one
/// `amount_sats` output plus a distinct change output.
pub fn shuffle_transaction(
    txid: &str,
    participants: usize,
    amount_sats: u64,
    input_sats: u64,
    block_time: i64,
) -> Transaction {
    let inputs = (0..participants)
        .map(|i| TxInput::resolved(&format!("{}-prev", txid), i as u32, input_sats))
        .collect();

    let mut outputs = Vec::with_capacity(participants * 2);
    for i in 0..participants {
        outputs.push(TxOutput::new(amount_sats as f64 / ONE_BTC as f64));
        // Change amounts are distinct and never equal to the shuffle amount
        let change = 1_000 + i as u64 * 7_919;
        outputs.push(TxOutput::new(change as f64 / ONE_BTC as f64));
    }

    Transaction {
        txid: txid.to_string(),
        inputs,
        outputs,
        block_time,
    }
}

/// Transaction with the given input values (sats) and output values (BTC)
pub fn transaction(
    txid: &str,
    input_sats: &[u64],
    outputs_btc: &[f64],
    block_time: i64,
) -> Transaction {
    Transaction {
        txid: txid.to_string(),
        inputs: input_sats
            .iter()
            .enumerate()
            .map(|(i, &value)| TxInput::resolved("funding", i as u32, value))
            .collect(),
        outputs: outputs_btc.iter().map(|&value| TxOutput::new(value)).collect(),
        block_time,
    }
}

/// A simple one-in, one-out payment
pub fn payment(txid: &str, block_time: i64) -> Transaction {
    transaction(txid, &[60_000], &[0.0005], block_time)
}

pub fn block(hash: &str, time: i64, txids: &[&str]) -> BlockInfo {
    BlockInfo {
        hash: hash.to_string(),
        time,
        txids: txids.iter().map(|txid| txid.to_string()).collect(),
    }
}

/// Wraps a source and fails selected lookups
pub struct FaultySource<S> {
    inner: S,
    failing_windows: HashSet<i64>,
    failing_blocks: HashSet<String>,
    malformed_transactions: HashSet<String>,
}

impl<S: ChainSource> FaultySource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_windows: HashSet::new(),
            failing_blocks: HashSet::new(),
            malformed_transactions: HashSet::new(),
        }
    }

    /// Fail the block-hash lookup for the window starting at `start`
    pub fn fail_window(mut self, start: i64) -> Self {
        self.failing_windows.insert(start);
        self
    }

    pub fn fail_block(mut self, hash: &str) -> Self {
        self.failing_blocks.insert(hash.to_string());
        self
    }

    pub fn malform_transaction(mut self, txid: &str) -> Self {
        self.malformed_transactions.insert(txid.to_string());
        self
    }
}

#[async_trait]
impl<S: ChainSource> ChainSource for FaultySource<S> {
    async fn block_hashes_in_range(&self, window: TimeWindow) -> SourceResult<Vec<String>> {
        if self.failing_windows.contains(&window.start) {
            return Err(SourceError::fetch(window.to_string(), "connection reset"));
        }
        self.inner.block_hashes_in_range(window).await
    }

    async fn block_info(&self, hash: &str) -> SourceResult<BlockInfo> {
        if self.failing_blocks.contains(hash) {
            return Err(SourceError::fetch(hash, "connection reset"));
        }
        self.inner.block_info(hash).await
    }

    async fn transaction(&self, txid: &str) -> SourceResult<Transaction> {
        if self.malformed_transactions.contains(txid) {
            return Err(SourceError::malformed(txid, "missing vout"));
        }
        self.inner.transaction(txid).await
    }

    fn source_name(&self) -> &'static str {
        "faulty"
    }
}

/// Events a report sink received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    WindowStarted { index: usize, start: i64, end: i64 },
    WindowLoaded { index: usize, blocks: usize, transactions: usize },
    Match(String),
    Progress { window: usize, done: usize, total: usize, percent: u8 },
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<ReportEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Match(txid) => Some(txid.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn progress_for(&self, window_index: usize) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Progress { window, percent, .. } if *window == window_index => {
                    Some(*percent)
                }
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for RecordingReporter {
    fn window_started(
        &mut self,
        window: &TimeWindow,
        index: usize,
        _count: usize,
    ) -> AppResult<()> {
        self.events.push(ReportEvent::WindowStarted {
            index,
            start: window.start,
            end: window.end,
        });
        Ok(())
    }

    fn window_loaded(
        &mut self,
        index: usize,
        block_count: usize,
        transaction_count: usize,
    ) -> AppResult<()> {
        self.events.push(ReportEvent::WindowLoaded {
            index,
            blocks: block_count,
            transactions: transaction_count,
        });
        Ok(())
    }

    fn match_found(&mut self, result: &ClassificationResult) -> AppResult<()> {
        self.events.push(ReportEvent::Match(result.txid.clone()));
        Ok(())
    }

    fn progress(
        &mut self,
        window_index: usize,
        done: usize,
        total: usize,
        percent: u8,
    ) -> AppResult<()> {
        self.events.push(ReportEvent::Progress {
            window: window_index,
            done,
            total,
            percent,
        });
        Ok(())
    }
}
