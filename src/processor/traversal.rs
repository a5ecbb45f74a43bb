//! Window-by-window traversal feeding the shuffle classifier
//!
//! Windows run strictly one after another so only one window's transactions
//! are ever held in memory. Inside a window, block and transaction lookups fan
//! out with bounded concurrency and are re-joined in their original order
//! before classification.

use crate::detection::ShuffleClassifier;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::processor::base::{ProgressReporter, WindowProgress};
use crate::report::ReportSink;
use crate::source::ChainSource;
use crate::types::{
    BlockInfo, ClassificationResult, ScanPlan, StatisticsCollector, TimeWindow, Transaction,
    TraversalSummary,
};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SECONDS_PER_DAY: i64 = 86_400;

/// A reporter failure loses that output line, never the run
fn record_report(result: AppResult<()>, summary: &mut TraversalSummary) {
    if let Err(e) = result {
        warn!("Report output failed: {}", e);
        summary.report_failures += 1;
    }
}

/// Cooperative cancellation flag, checked before each window starts
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Drives a `ChainSource` through a `ScanPlan`
pub struct ShuffleScanner<S: ChainSource> {
    source: S,
    classifier: ShuffleClassifier,
    concurrency: usize,
    fetch_timeout: Duration,
    stop: StopHandle,
}

impl<S: ChainSource> ShuffleScanner<S> {
    pub fn new(source: S, classifier: ShuffleClassifier) -> Self {
        Self {
            source,
            classifier,
            concurrency: 16,
            fetch_timeout: Duration::from_secs(60),
            stop: StopHandle::new(),
        }
    }

    /// In-flight lookups per window; values below 1 are raised to 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Scan every window of `plan` in order.
    ///
    /// Every classification result goes to `sink`; matches and progress also go
    /// to `reporter`. Lookup and reporter failures are logged, counted and
    /// skipped. Only an invalid plan ends the run with an error.
    pub async fn traverse<R, F>(
        &self,
        plan: &ScanPlan,
        reporter: &mut R,
        mut sink: F,
    ) -> AppResult<TraversalSummary>
    where
        R: ReportSink + ?Sized,
        F: FnMut(&ClassificationResult),
    {
        plan.validate()?;

        info!(
            "Scanning {} windows of {}s from {} using {} source",
            plan.window_count,
            plan.window_seconds,
            plan.start,
            self.source.source_name()
        );

        let mut summary = TraversalSummary::new();
        for (index, window) in plan.windows().enumerate() {
            if self.stop.is_stop_requested() {
                info!(
                    "Stop requested; ending before window {}/{}",
                    index + 1,
                    plan.window_count
                );
                summary.stopped_early = true;
                break;
            }

            let window_summary = self
                .scan_window(index, plan.window_count, window, reporter, &mut sink)
                .await;
            summary.merge(&window_summary);
        }

        summary.finish();
        ProgressReporter::report_completion("CoinShuffle scan", &summary);
        info!("{}", summary.summary());
        Ok(summary)
    }

    /// Fetch and classify one window; lookup failures never escape
    pub async fn scan_window<R, F>(
        &self,
        index: usize,
        count: usize,
        window: TimeWindow,
        reporter: &mut R,
        sink: &mut F,
    ) -> TraversalSummary
    where
        R: ReportSink + ?Sized,
        F: FnMut(&ClassificationResult),
    {
        let mut summary = TraversalSummary::new();
        summary.windows_scanned = 1;
        record_report(reporter.window_started(&window, index, count), &mut summary);

        let window_label = window.to_string();
        let hashes = match self
            .with_timeout(
                self.window_lookup_timeout(&window),
                &window_label,
                self.source.block_hashes_in_range(window),
            )
            .await
        {
            Ok(hashes) => hashes,
            Err(e) => {
                warn!("Skipping window {} ({}): {}", index + 1, window_label, e);
                summary.windows_failed = 1;
                return summary;
            }
        };
        summary.blocks_found = hashes.len() as u64;

        let txids = self.collect_txids(&hashes, &mut summary).await;
        record_report(
            reporter.window_loaded(index, hashes.len(), txids.len()),
            &mut summary,
        );

        let transactions = self.fetch_transactions(&txids, &mut summary).await;

        let mut progress = WindowProgress::new(index, transactions.len());
        for tx in &transactions {
            let result = self.classifier.classify(tx);
            summary.transactions_classified += 1;
            if result.is_match {
                summary.matches_found += 1;
                if !result.is_valid() {
                    summary.matches_flagged_invalid += 1;
                }
                record_report(reporter.match_found(&result), &mut summary);
            }
            sink(&result);

            for percent in progress.advance() {
                let reported = reporter.progress(
                    progress.window_index(),
                    progress.done(),
                    progress.total(),
                    percent,
                );
                record_report(reported, &mut summary);
            }
        }

        debug!(
            "Window {} done: {} blocks, {} transactions, {} matches",
            index + 1,
            summary.blocks_found,
            summary.transactions_classified,
            summary.matches_found
        );
        summary
    }

    /// Block details in hash order; transaction ids concatenated in that order
    async fn collect_txids(
        &self,
        hashes: &[String],
        summary: &mut TraversalSummary,
    ) -> Vec<String> {
        let blocks: Vec<SourceResult<BlockInfo>> = stream::iter(hashes)
            .map(|hash| {
                self.with_timeout(self.fetch_timeout, hash, self.source.block_info(hash))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut txids = Vec::new();
        for (hash, block) in hashes.iter().zip(blocks) {
            match block {
                Ok(block) => txids.extend(block.txids),
                Err(e) => {
                    warn!("Skipping block {}: {}", hash, e);
                    summary.blocks_failed += 1;
                }
            }
        }
        txids
    }

    /// Transactions in id order; failures are logged with the txid and dropped
    async fn fetch_transactions(
        &self,
        txids: &[String],
        summary: &mut TraversalSummary,
    ) -> Vec<Transaction> {
        summary.transactions_attempted += txids.len() as u64;

        let fetched: Vec<SourceResult<Transaction>> = stream::iter(txids)
            .map(|txid| {
                self.with_timeout(self.fetch_timeout, txid, self.source.transaction(txid))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut transactions = Vec::with_capacity(fetched.len());
        for (txid, result) in txids.iter().zip(fetched) {
            match result {
                Ok(tx) => transactions.push(tx),
                Err(e) => {
                    warn!("TX id {} not checked: {}", txid, e);
                    summary.record_transaction_failure(&e);
                }
            }
        }
        transactions
    }

    /// Listing a window walks one header per block, so the budget grows by one
    /// fetch timeout per day of window
    fn window_lookup_timeout(&self, window: &TimeWindow) -> Duration {
        let days = (window.duration_seconds() / SECONDS_PER_DAY).clamp(0, u32::MAX as i64 - 1);
        self.fetch_timeout.saturating_mul(days as u32 + 1)
    }

    async fn with_timeout<T>(
        &self,
        limit: Duration,
        target: &str,
        lookup: impl Future<Output = SourceResult<T>>,
    ) -> SourceResult<T> {
        match tokio::time::timeout(limit, lookup).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                target: target.to_string(),
                timeout_seconds: limit.as_secs(),
            }),
        }
    }
}
