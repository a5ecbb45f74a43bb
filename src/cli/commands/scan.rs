use crate::cli::commands::{load_config, RpcArgs};
use crate::config::{AppConfig, ScanConfig};
use crate::detection::ShuffleClassifier;
use crate::errors::AppResult;
use crate::processor::{ConfigValidator, ShuffleScanner};
use crate::report::ConsoleReporter;
use crate::rpc::BitcoinRpcClient;
use crate::source::{ChainSource, InMemoryChainSource};
use crate::types::{StatisticsCollector, TraversalSummary};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Scan a time range window by window for CoinShuffle candidates
#[derive(Args)]
pub struct ScanCommand {
    /// Replay a JSON chain snapshot instead of querying Bitcoin Core
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Unix timestamp of the first window (overrides config.toml)
    #[arg(long)]
    start: Option<i64>,

    /// Window length in seconds (overrides config.toml)
    #[arg(long)]
    window_seconds: Option<i64>,

    /// Number of windows to scan (overrides config.toml)
    #[arg(long)]
    window_count: Option<usize>,

    /// In-flight block/transaction lookups per window (overrides config.toml)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-lookup timeout in seconds (overrides config.toml)
    #[arg(long)]
    fetch_timeout: Option<u64>,

    /// Minimum inputs for a transaction to be considered (overrides config.toml)
    #[arg(long)]
    min_participants: Option<usize>,

    #[command(flatten)]
    rpc: RpcArgs,
}

impl ScanCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== CoinShuffle Scanner ===");

        let mut app_config = load_config()?;
        self.apply_overrides(&mut app_config);

        ConfigValidator::validate_scan_config(&app_config.scan)?;
        ConfigValidator::validate_classifier_config(&app_config.classifier)?;
        let plan = app_config.scan.scan_plan()?;

        println!("Checking block chain for CoinShuffle transactions.");

        let summary = match &self.snapshot {
            Some(path) => {
                ConfigValidator::log_config_summary(
                    "Scan",
                    &app_config.scan,
                    &app_config.classifier,
                    Some(&format!("Snapshot: {}", path.display())),
                );
                let source = InMemoryChainSource::from_json_file(path)?;
                scan_with(source, &app_config).await?
            }
            None => {
                ConfigValidator::validate_rpc_config(&app_config.bitcoin_rpc)?;
                ConfigValidator::log_config_summary(
                    "Scan",
                    &app_config.scan,
                    &app_config.classifier,
                    Some(&format!("Bitcoin RPC: {}", app_config.bitcoin_rpc.url)),
                );
                let client = BitcoinRpcClient::new(app_config.bitcoin_rpc.clone())
                    .await?
                    .with_shape_filter(ShuffleClassifier::new(
                        app_config.classifier.min_participants,
                    ));
                let summary = scan_with(&client, &app_config).await?;

                let cache_stats = client.get_cache_stats();
                info!(
                    "RPC errors: {} | cache hit rate: {:.1}% ({} lookups)",
                    client.get_error_count(),
                    cache_stats.hit_rate(),
                    cache_stats.total_requests()
                );
                summary
            }
        };

        print_summary(&summary, plan.window_count);
        Ok(())
    }

    fn apply_overrides(&self, app_config: &mut AppConfig) {
        let scan: &mut ScanConfig = &mut app_config.scan;
        if let Some(start) = self.start {
            scan.start_timestamp = start;
        }
        if let Some(seconds) = self.window_seconds {
            scan.window_seconds = seconds;
        }
        if let Some(count) = self.window_count {
            scan.window_count = count;
        }
        if let Some(concurrency) = self.concurrency {
            scan.concurrent_fetches = concurrency;
        }
        if let Some(timeout) = self.fetch_timeout {
            scan.fetch_timeout_seconds = timeout;
        }
        if let Some(min) = self.min_participants {
            app_config.classifier.min_participants = min;
        }
        self.rpc.apply(&mut app_config.bitcoin_rpc);
    }
}

async fn scan_with<S: ChainSource>(
    source: S,
    app_config: &AppConfig,
) -> AppResult<TraversalSummary> {
    let plan = app_config.scan.scan_plan()?;
    let scanner = ShuffleScanner::new(
        source,
        ShuffleClassifier::new(app_config.classifier.min_participants),
    )
    .with_concurrency(app_config.scan.concurrent_fetches)
    .with_fetch_timeout(Duration::from_secs(app_config.scan.fetch_timeout_seconds));

    // Ctrl-C finishes the current window and stops
    let stop = scanner.stop_handle();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current window");
            stop.request_stop();
        }
    });

    let mut reporter = ConsoleReporter::stdout();
    let result = scanner.traverse(&plan, &mut reporter, |_| {}).await;
    signal_task.abort();
    result
}

fn print_summary(summary: &TraversalSummary, window_count: usize) {
    println!("\n=== SCAN SUMMARY ===");
    println!(
        "Windows scanned: {}/{} ({} failed)",
        summary.windows_scanned, window_count, summary.windows_failed
    );
    println!(
        "Blocks: {} ({} failed)",
        summary.blocks_found, summary.blocks_failed
    );
    println!("Transactions attempted: {}", summary.transactions_attempted);
    println!(
        "Transactions skipped: {} (not found: {}, malformed: {}, timed out: {}, fetch errors: {})",
        summary.transactions_skipped(),
        summary.transactions_not_found,
        summary.transactions_malformed,
        summary.transactions_timed_out,
        summary.transactions_fetch_failed
    );
    println!(
        "Matches: {} ({} with underfunded or unresolved inputs)",
        summary.matches_found, summary.matches_flagged_invalid
    );
    println!(
        "Elapsed: {}",
        crate::processor::ProgressReporter::format_elapsed_time(summary.duration().as_secs_f64())
    );
    if summary.report_failures > 0 {
        println!("Report lines lost: {}", summary.report_failures);
    }
    if summary.stopped_early {
        println!("Stopped early on request");
    }
}
