use crate::config::{BitcoinRpcConfig, ClassifierConfig, ScanConfig};
use crate::errors::{AppError, AppResult};
use crate::types::{StatisticsCollector, TraversalSummary};
use crate::utils::math::progress_milestones;
use tracing::{info, warn};

/// Configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Check scan settings before any window is fetched
    pub fn validate_scan_config(config: &ScanConfig) -> AppResult<()> {
        config.scan_plan()?;
        if config.concurrent_fetches == 0 {
            return Err(AppError::Config(
                "Concurrent fetches must be greater than 0".to_string(),
            ));
        }
        if config.fetch_timeout_seconds == 0 {
            return Err(AppError::Config(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }
        if config.concurrent_fetches > 256 {
            warn!(
                "High fetch concurrency: {} - this may overload the node",
                config.concurrent_fetches
            );
        }
        Ok(())
    }

    pub fn validate_classifier_config(config: &ClassifierConfig) -> AppResult<()> {
        if config.min_participants < 2 {
            return Err(AppError::Config(format!(
                "Minimum participants must be at least 2 (got {})",
                config.min_participants
            )));
        }
        Ok(())
    }

    pub fn validate_rpc_config(config: &BitcoinRpcConfig) -> AppResult<()> {
        if config.url.is_empty() {
            return Err(AppError::Config("RPC URL must not be empty".to_string()));
        }
        if config.concurrent_requests == 0 {
            return Err(AppError::Config(
                "Concurrent RPC requests must be greater than 0".to_string(),
            ));
        }
        if config.timeout_seconds == 0 {
            return Err(AppError::Config(
                "RPC timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_config_summary(
        processor_name: &str,
        scan: &ScanConfig,
        classifier: &ClassifierConfig,
        additional_info: Option<&str>,
    ) {
        info!("=== {} Configuration ===", processor_name);
        info!("  Start timestamp: {}", scan.start_timestamp);
        info!(
            "  Windows: {} x {}s",
            scan.window_count, scan.window_seconds
        );
        info!("  Concurrent fetches: {}", scan.concurrent_fetches);
        info!("  Fetch timeout: {}s", scan.fetch_timeout_seconds);
        info!("  Minimum participants: {}", classifier.min_participants);
        if let Some(info) = additional_info {
            info!("  {}", info);
        }
    }
}

/// Classification counter for one window pass.
///
/// Created when a window's transactions are fetched and dropped when the
/// window ends; only the classification loop advances it.
#[derive(Debug)]
pub struct WindowProgress {
    window_index: usize,
    done: usize,
    total: usize,
}

impl WindowProgress {
    pub fn new(window_index: usize, total: usize) -> Self {
        Self {
            window_index,
            done: 0,
            total,
        }
    }

    /// Count one classified transaction; returns the milestones it crossed
    pub fn advance(&mut self) -> Vec<u8> {
        self.done += 1;
        progress_milestones(self.done, self.total)
    }

    pub fn window_index(&self) -> usize {
        self.window_index
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Progress reporting utilities
pub struct ProgressReporter;

impl ProgressReporter {
    /// Format elapsed seconds into human-readable time (days, hours, minutes, seconds)
    pub fn format_elapsed_time(elapsed_secs: f64) -> String {
        if elapsed_secs < 60.0 {
            format!("{:.1}s", elapsed_secs)
        } else if elapsed_secs < 3600.0 {
            let minutes = (elapsed_secs / 60.0).floor();
            let seconds = elapsed_secs % 60.0;
            format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
        } else if elapsed_secs < 86400.0 {
            let hours = (elapsed_secs / 3600.0).floor();
            let remaining = elapsed_secs % 3600.0;
            let minutes = (remaining / 60.0).floor();
            let seconds = remaining % 60.0;
            format!(
                "{}h {}m {:.0}s ({:.1}s)",
                hours, minutes, seconds, elapsed_secs
            )
        } else {
            let days = (elapsed_secs / 86400.0).floor();
            let remaining = elapsed_secs % 86400.0;
            let hours = (remaining / 3600.0).floor();
            let remaining = remaining % 3600.0;
            let minutes = (remaining / 60.0).floor();
            let seconds = remaining % 60.0;
            format!(
                "{}d {}h {}m {:.0}s ({:.1}s)",
                days, hours, minutes, seconds, elapsed_secs
            )
        }
    }

    pub fn report_completion(operation: &str, summary: &TraversalSummary) {
        info!("=== {} Completed ===", operation);
        info!(
            "  Windows scanned: {} ({} failed)",
            summary.windows_scanned, summary.windows_failed
        );
        info!(
            "  Blocks: {} ({} failed)",
            summary.blocks_found, summary.blocks_failed
        );
        info!(
            "  Transactions attempted: {}",
            summary.transactions_attempted
        );
        info!(
            "  Transactions skipped: {} ({:.2}%)",
            summary.transactions_skipped(),
            summary.skip_rate()
        );
        info!(
            "  Matches: {} ({} flagged invalid)",
            summary.matches_found, summary.matches_flagged_invalid
        );
        info!(
            "  Time elapsed: {}",
            Self::format_elapsed_time(summary.duration().as_secs_f64())
        );
        info!(
            "  Average rate: {:.1} tx/sec",
            summary.processing_rate()
        );
        if summary.report_failures > 0 {
            warn!("  Report lines lost: {}", summary.report_failures);
        }
        if summary.stopped_early {
            warn!("  Stopped before the last window");
        }
    }
}
