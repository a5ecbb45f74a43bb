//! Scanning a JSON chain snapshot from disk

use crate::common::{block, payment, shuffle_transaction, RecordingReporter, ONE_BTC};
use anyhow::Result;
use coinshuffle_scan::detection::ShuffleClassifier;
use coinshuffle_scan::errors::AppError;
use coinshuffle_scan::processor::ShuffleScanner;
use coinshuffle_scan::report::ConsoleReporter;
use coinshuffle_scan::source::{ChainSnapshot, InMemoryChainSource};
use coinshuffle_scan::types::ScanPlan;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_snapshot(snapshot: &ChainSnapshot) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(serde_json::to_string_pretty(snapshot)?.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[tokio::test]
async fn test_snapshot_scan_reports_matches() -> Result<()> {
    let time = 1414807200 + 3_600;
    let mut shuffle = shuffle_transaction("coinshuffle", 6, ONE_BTC / 2, ONE_BTC, time);
    // One participant could not have funded the amount
    shuffle.inputs[3].value_sat = Some(ONE_BTC / 4);

    let snapshot = ChainSnapshot {
        blocks: vec![block("b-1", time, &["p-1", "coinshuffle"])],
        transactions: vec![payment("p-1", time), shuffle],
    };
    let file = write_snapshot(&snapshot)?;

    let source = InMemoryChainSource::from_json_file(file.path())?;
    assert_eq!(source.block_count(), 1);
    assert_eq!(source.transaction_count(), 2);

    let scanner = ShuffleScanner::new(source, ShuffleClassifier::default());
    let plan = ScanPlan::new(1414807200, 86400, 30)?;
    let mut reporter = ConsoleReporter::new(Vec::new());
    let summary = scanner.traverse(&plan, &mut reporter, |_| {}).await?;

    assert_eq!(summary.windows_scanned, 30);
    assert_eq!(summary.matches_found, 1);
    assert_eq!(summary.matches_flagged_invalid, 1);

    let output = String::from_utf8(reporter.into_inner())?;
    assert!(output.contains("[TX id: coinshuffle] Ins: 6 Outs: 12"));
    assert!(output.contains("[TX id: coinshuffle] 6 occurrences of 50000000 satoshi (0.5 BTC)"));
    assert!(output.contains(
        "[TX id: coinshuffle] Warning: not every participant is able to spend 0.5BTC! (1 too low)"
    ));
    assert!(output.contains(
        "summary: [2014-11-01 03:00:00][TX id: coinshuffle] [i: 6 o: 12] [s: 50000000 btc: 0.5] [valid: 0]"
    ));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_with_invalid_output_value_is_skipped() -> Result<()> {
    let mut broken = payment("broken", 100);
    broken.outputs[0].value_btc = -1.0;
    let snapshot = ChainSnapshot {
        blocks: vec![block("b", 100, &["broken"])],
        transactions: vec![broken],
    };
    let file = write_snapshot(&snapshot)?;

    let scanner = ShuffleScanner::new(
        InMemoryChainSource::from_json_file(file.path())?,
        ShuffleClassifier::default(),
    );
    let mut reporter = RecordingReporter::new();
    let summary = scanner
        .traverse(&ScanPlan::new(0, 1_000, 1)?, &mut reporter, |_| {})
        .await?;

    assert_eq!(summary.transactions_malformed, 1);
    assert_eq!(summary.transactions_classified, 0);
    Ok(())
}

#[test]
fn test_unparseable_snapshot_is_invalid_data() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"{ \"blocks\": [ { \"hash\": 5 } ] }")?;
    file.flush()?;

    assert!(matches!(
        InMemoryChainSource::from_json_file(file.path()),
        Err(AppError::InvalidData(_))
    ));
    Ok(())
}
