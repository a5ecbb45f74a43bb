//! Console reporting for matches and per-window progress
//!
//! Matches print as a multi-line block prefixed with `[TX id: <txid>] `
//! followed by a one-line `summary:` record meant for grepping. Progress
//! prints at 10% steps of a window's transaction count.

use crate::errors::{AppError, AppResult};
use crate::types::{ClassificationResult, TimeWindow};
use crate::utils::currency::format_btc;
use crate::utils::time::{format_timestamp, format_timestamp_with_ts, now_timestamp};
use std::io::{self, Stdout, Write};

/// Receiver for traversal output
pub trait ReportSink {
    /// A window pass is about to fetch its blocks
    fn window_started(&mut self, window: &TimeWindow, index: usize, count: usize)
        -> AppResult<()>;

    /// Block and transaction ids for the window are known
    fn window_loaded(
        &mut self,
        _index: usize,
        _block_count: usize,
        _transaction_count: usize,
    ) -> AppResult<()> {
        Ok(())
    }

    /// A transaction passed the shuffle heuristic
    fn match_found(&mut self, result: &ClassificationResult) -> AppResult<()>;

    /// `percent` milestone reached after classifying `done` of `total`
    fn progress(
        &mut self,
        window_index: usize,
        done: usize,
        total: usize,
        percent: u8,
    ) -> AppResult<()>;
}

/// Writes reports as plain text lines, stdout by default
pub struct ConsoleReporter<W: Write = Stdout> {
    out: W,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_lines<I, S>(&mut self, lines: I) -> AppResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            writeln!(self.out, "{}", line.as_ref()).map_err(AppError::Io)?;
        }
        self.out.flush().map_err(AppError::Io)
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn window_started(&mut self, window: &TimeWindow, index: usize, count: usize) -> AppResult<()> {
        self.write_lines([
            format!("Window {}/{}", index + 1, count),
            format!("-> Start {}", format_timestamp(window.start)),
            format!("<- End {}", format_timestamp(window.end)),
        ])
    }

    fn window_loaded(
        &mut self,
        _index: usize,
        block_count: usize,
        transaction_count: usize,
    ) -> AppResult<()> {
        self.write_lines([
            format!("Block hashes: {}", block_count),
            format!("Transaction hashes: {}", transaction_count),
        ])
    }

    fn match_found(&mut self, result: &ClassificationResult) -> AppResult<()> {
        let mut lines = format_match_report(result);
        lines.push(format_summary_line(result));
        self.write_lines(lines)
    }

    fn progress(
        &mut self,
        _window_index: usize,
        done: usize,
        total: usize,
        percent: u8,
    ) -> AppResult<()> {
        self.write_lines([format_progress_line(percent, done, total, now_timestamp())])
    }
}

/// Human-readable lines for a match, each prefixed with the transaction id
pub fn format_match_report(result: &ClassificationResult) -> Vec<String> {
    let prefix = format!("[TX id: {}] ", result.txid);
    let amount = result.matched_amount.unwrap_or_default();
    let btc = format_btc(amount);

    let mut lines = vec![
        format!(
            "{}Possible CoinShuffle transaction [{}]",
            prefix,
            format_timestamp_with_ts(result.block_time)
        ),
        format!(
            "{}Ins: {} Outs: {}",
            prefix, result.input_count, result.output_count
        ),
        format!(
            "{}{} occurrences of {} satoshi ({} BTC)",
            prefix, result.occurrence_count, amount, btc
        ),
    ];

    if result.participants_unable_to_spend > 0 {
        lines.push(format!(
            "{}Warning: not every participant is able to spend {}BTC! ({} too low)",
            prefix, btc, result.participants_unable_to_spend
        ));
    }
    if result.unresolved_inputs > 0 {
        lines.push(format!(
            "{}Warning: {} input value(s) could not be resolved",
            prefix, result.unresolved_inputs
        ));
    }
    lines
}

/// Single-line record: date, txid, counts, amount and validity flag
pub fn format_summary_line(result: &ClassificationResult) -> String {
    let amount = result.matched_amount.unwrap_or_default();
    format!(
        "summary: [{}][TX id: {}] [i: {} o: {}] [s: {} btc: {}] [valid: {}]",
        format_timestamp(result.block_time),
        result.txid,
        result.input_count,
        result.output_count,
        amount,
        format_btc(amount),
        u8::from(result.is_valid())
    )
}

pub fn format_progress_line(percent: u8, done: usize, total: usize, now: i64) -> String {
    format!(
        "{}% [{}/{}] @ {}",
        percent,
        done,
        total,
        format_timestamp_with_ts(now)
    )
}
