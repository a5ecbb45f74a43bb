//! Output amount histogram
//!
//! Counts how many outputs carry each distinct satoshi amount. Iteration follows
//! the order in which each amount first appeared, so any "first amount with N
//! occurrences" query is deterministic for a fixed output ordering.

use crate::types::TxOutput;
use crate::utils::currency::btc_to_sats;
use std::collections::HashMap;

/// Satoshi amount -> occurrence count, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountHistogram {
    entries: Vec<(u64, usize)>,
    positions: HashMap<u64, usize>,
}

impl AmountHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more output of `amount` satoshis
    pub fn record(&mut self, amount: u64) {
        match self.positions.get(&amount) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.positions.insert(amount, self.entries.len());
                self.entries.push((amount, 1));
            }
        }
    }

    pub fn count(&self, amount: u64) -> usize {
        self.positions
            .get(&amount)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Number of distinct amounts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts (equals the number of outputs aggregated)
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// First amount, in first-seen order, that occurs exactly `occurrences` times
    pub fn first_with_count(&self, occurrences: usize) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, count)| *count == occurrences)
            .map(|(amount, _)| *amount)
    }
}

/// Build the amount histogram for a transaction's outputs
pub fn aggregate(outputs: &[TxOutput]) -> AmountHistogram {
    let mut histogram = AmountHistogram::new();
    for output in outputs {
        histogram.record(btc_to_sats(output.value_btc));
    }
    histogram
}
