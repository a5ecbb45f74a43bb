//! Lookup failures are logged, counted and skipped without ending the run

use crate::common::{
    block, payment, shuffle_transaction, FaultySource, RecordingReporter, ReportEvent, ONE_BTC,
};
use anyhow::Result;
use coinshuffle_scan::detection::ShuffleClassifier;
use coinshuffle_scan::processor::ShuffleScanner;
use coinshuffle_scan::source::InMemoryChainSource;
use coinshuffle_scan::types::{ClassificationResult, ScanPlan};

const START: i64 = 1396317600;
const DAY: i64 = 86400;

/// One shuffle and one payment per day for three days
fn three_day_chain() -> InMemoryChainSource {
    let mut source = InMemoryChainSource::new();
    for day in 0..3i64 {
        let time = START + day * DAY + 600;
        let shuffle_id = format!("shuffle-{}", day);
        let payment_id = format!("payment-{}", day);
        source.add_block(block(
            &format!("block-{}", day),
            time,
            &[&payment_id, &shuffle_id],
        ));
        source.add_transaction(payment(&payment_id, time));
        source.add_transaction(shuffle_transaction(
            &shuffle_id,
            5,
            ONE_BTC,
            2 * ONE_BTC,
            time,
        ));
    }
    source
}

#[tokio::test]
async fn test_failed_window_does_not_stop_traversal() -> Result<()> {
    let source = FaultySource::new(three_day_chain()).fail_window(START + DAY);
    let scanner = ShuffleScanner::new(source, ShuffleClassifier::default()).with_concurrency(2);
    let plan = ScanPlan::new(START, DAY, 3)?;
    let mut reporter = RecordingReporter::new();
    let mut results: Vec<ClassificationResult> = Vec::new();

    let summary = scanner
        .traverse(&plan, &mut reporter, |result| results.push(result.clone()))
        .await?;

    let txids: Vec<&str> = results.iter().map(|r| r.txid.as_str()).collect();
    assert_eq!(txids, vec!["payment-0", "shuffle-0", "payment-2", "shuffle-2"]);
    assert_eq!(reporter.matches(), vec!["shuffle-0", "shuffle-2"]);

    assert_eq!(summary.windows_scanned, 3);
    assert_eq!(summary.windows_failed, 1);
    assert_eq!(summary.matches_found, 2);
    assert_eq!(summary.transactions_classified, 4);
    assert!(!summary.stopped_early);

    // The failed window still announced itself but never loaded
    let started = reporter
        .events
        .iter()
        .filter(|e| matches!(e, ReportEvent::WindowStarted { .. }))
        .count();
    let loaded: Vec<usize> = reporter
        .events
        .iter()
        .filter_map(|e| match e {
            ReportEvent::WindowLoaded { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, 3);
    assert_eq!(loaded, vec![0, 2]);
    Ok(())
}

#[tokio::test]
async fn test_failed_block_and_malformed_transaction_are_skipped() -> Result<()> {
    let mut chain = three_day_chain();
    chain.add_block(block("extra", START + 900, &["payment-extra"]));
    chain.add_transaction(payment("payment-extra", START + 900));

    let source = FaultySource::new(chain)
        .fail_block("extra")
        .malform_transaction("payment-0");
    let scanner = ShuffleScanner::new(source, ShuffleClassifier::default());
    let plan = ScanPlan::new(START, DAY, 1)?;
    let mut reporter = RecordingReporter::new();
    let mut seen = Vec::new();

    let summary = scanner
        .traverse(&plan, &mut reporter, |result| seen.push(result.txid.clone()))
        .await?;

    assert_eq!(seen, vec!["shuffle-0"]);
    assert_eq!(summary.blocks_found, 2);
    assert_eq!(summary.blocks_failed, 1);
    assert_eq!(summary.transactions_attempted, 2);
    assert_eq!(summary.transactions_malformed, 1);
    assert_eq!(summary.transactions_skipped(), 1);
    // A single classified transaction crosses every mark from 50% up at once
    assert_eq!(reporter.progress_for(0), vec![0, 50, 60, 70, 80, 90, 100]);
    Ok(())
}

#[tokio::test]
async fn test_stop_handle_ends_run_at_window_boundary() -> Result<()> {
    let scanner = ShuffleScanner::new(three_day_chain(), ShuffleClassifier::default());
    let stop = scanner.stop_handle();
    let plan = ScanPlan::new(START, DAY, 3)?;
    let mut reporter = RecordingReporter::new();

    // Stop as soon as the first match is seen; the current window still completes
    let summary = scanner
        .traverse(&plan, &mut reporter, |result| {
            if result.is_match {
                stop.request_stop();
            }
        })
        .await?;

    assert!(summary.stopped_early);
    assert_eq!(summary.windows_scanned, 1);
    assert_eq!(summary.transactions_classified, 2);
    Ok(())
}

#[tokio::test]
async fn test_progress_is_scoped_to_each_window() -> Result<()> {
    let scanner = ShuffleScanner::new(three_day_chain(), ShuffleClassifier::default());
    let plan = ScanPlan::new(START, DAY, 3)?;
    let mut reporter = RecordingReporter::new();

    scanner.traverse(&plan, &mut reporter, |_| {}).await?;

    for window in 0..3 {
        let progress = reporter.progress_for(window);
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
    }
    let totals: Vec<usize> = reporter
        .events
        .iter()
        .filter_map(|e| match e {
            ReportEvent::Progress { total, .. } => Some(*total),
            _ => None,
        })
        .collect();
    assert!(totals.iter().all(|&total| total == 2));
    Ok(())
}
