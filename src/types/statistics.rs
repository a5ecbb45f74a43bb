//! Statistics collected over a traversal run

use crate::errors::SourceError;
use crate::utils::math::safe_percentage_u64;
use std::time::{Duration, Instant};

/// Common trait for all statistics collectors
pub trait StatisticsCollector {
    /// Reset all counters to zero
    fn reset(&mut self);

    /// Get the processing start time
    fn start_time(&self) -> Instant;

    /// Get the total processing duration
    fn duration(&self) -> Duration;

    /// Calculate the processing rate (items per second)
    fn processing_rate(&self) -> f64;

    /// Finalize statistics collection
    fn finish(&mut self);

    /// Get a summary of the statistics
    fn summary(&self) -> String;
}

/// Common timing information for all statistics
#[derive(Debug, Clone)]
pub struct TimingInfo {
    pub start_time: Instant,
    pub processing_duration: Duration,
}

impl Default for TimingInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingInfo {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            processing_duration: Duration::default(),
        }
    }

    pub fn finish(&mut self) {
        self.processing_duration = self.start_time.elapsed();
    }

    pub fn elapsed(&self) -> Duration {
        if self.processing_duration.is_zero() {
            self.start_time.elapsed()
        } else {
            self.processing_duration
        }
    }
}

/// End-of-run accounting for a traversal
#[derive(Debug, Clone, Default)]
pub struct TraversalSummary {
    pub windows_scanned: u64,
    /// Windows whose block-hash lookup failed outright
    pub windows_failed: u64,
    pub blocks_found: u64,
    pub blocks_failed: u64,
    pub transactions_attempted: u64,
    pub transactions_classified: u64,
    pub transactions_not_found: u64,
    pub transactions_malformed: u64,
    pub transactions_timed_out: u64,
    pub transactions_fetch_failed: u64,
    pub matches_found: u64,
    /// Matches where at least one participant could not have funded the amount
    pub matches_flagged_invalid: u64,
    /// Report lines that could not be written
    pub report_failures: u64,
    /// Run ended at a window boundary because a stop was requested
    pub stopped_early: bool,
    pub timing: TimingInfo,
}

impl TraversalSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one transaction that could not be fetched
    pub fn record_transaction_failure(&mut self, error: &SourceError) {
        match error {
            SourceError::NotFound { .. } => self.transactions_not_found += 1,
            SourceError::Malformed { .. } => self.transactions_malformed += 1,
            SourceError::Timeout { .. } => self.transactions_timed_out += 1,
            SourceError::Fetch { .. } => self.transactions_fetch_failed += 1,
        }
    }

    pub fn transactions_skipped(&self) -> u64 {
        self.transactions_not_found
            + self.transactions_malformed
            + self.transactions_timed_out
            + self.transactions_fetch_failed
    }

    pub fn match_rate(&self) -> f64 {
        safe_percentage_u64(self.matches_found, self.transactions_classified)
    }

    pub fn skip_rate(&self) -> f64 {
        safe_percentage_u64(self.transactions_skipped(), self.transactions_attempted)
    }

    /// Fold another summary's counters into this one
    pub fn merge(&mut self, other: &TraversalSummary) {
        self.windows_scanned += other.windows_scanned;
        self.windows_failed += other.windows_failed;
        self.blocks_found += other.blocks_found;
        self.blocks_failed += other.blocks_failed;
        self.transactions_attempted += other.transactions_attempted;
        self.transactions_classified += other.transactions_classified;
        self.transactions_not_found += other.transactions_not_found;
        self.transactions_malformed += other.transactions_malformed;
        self.transactions_timed_out += other.transactions_timed_out;
        self.transactions_fetch_failed += other.transactions_fetch_failed;
        self.matches_found += other.matches_found;
        self.matches_flagged_invalid += other.matches_flagged_invalid;
        self.report_failures += other.report_failures;
        self.stopped_early |= other.stopped_early;
    }
}

impl StatisticsCollector for TraversalSummary {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn start_time(&self) -> Instant {
        self.timing.start_time
    }

    fn duration(&self) -> Duration {
        self.timing.elapsed()
    }

    fn processing_rate(&self) -> f64 {
        let elapsed = self.timing.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_classified as f64 / elapsed
        } else {
            0.0
        }
    }

    fn finish(&mut self) {
        self.timing.finish();
    }

    fn summary(&self) -> String {
        format!(
            "Scan: {} windows ({} failed), {} blocks ({} failed), {} transactions attempted, {} classified, {} skipped ({} not found, {} malformed, {} timed out, {} fetch errors), {} matches ({:.4}%), {} report failures{}",
            self.windows_scanned,
            self.windows_failed,
            self.blocks_found,
            self.blocks_failed,
            self.transactions_attempted,
            self.transactions_classified,
            self.transactions_skipped(),
            self.transactions_not_found,
            self.transactions_malformed,
            self.transactions_timed_out,
            self.transactions_fetch_failed,
            self.matches_found,
            self.match_rate(),
            self.report_failures,
            if self.stopped_early { " [stopped early]" } else { "" }
        )
    }
}
