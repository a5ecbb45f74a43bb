//! CoinShuffle candidate heuristic
//!
//! A shuffle among N participants produces N inputs and 2N outputs: one
//! equal-denomination output plus one change output per participant. The
//! classifier applies, in order and short-circuiting:
//!
//! 1. **Participant gate**: at least `min_participants` inputs (default 5)
//! 2. **Shape gate**: exactly twice as many outputs as inputs
//! 3. **Repetition test**: some satoshi amount occurs exactly N times
//!
//! Under the shape gate at most one amount can occur exactly N times unless the
//! remaining outputs also repeat; when several qualify, the amount that appears
//! first in output order wins.
//!
//! A match also carries a spendability diagnostic: how many inputs were too
//! small to have funded the shuffle amount, and how many could not be resolved.

use crate::detection::aggregator::aggregate;
use crate::types::{ClassificationResult, Transaction};

/// Default minimum anonymity set worth flagging
pub const DEFAULT_MIN_PARTICIPANTS: usize = 5;

/// Shuffle classifier with a tunable participant threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleClassifier {
    min_participants: usize,
}

impl Default for ShuffleClassifier {
    fn default() -> Self {
        Self {
            min_participants: DEFAULT_MIN_PARTICIPANTS,
        }
    }
}

impl ShuffleClassifier {
    pub fn new(min_participants: usize) -> Self {
        Self { min_participants }
    }

    pub fn min_participants(&self) -> usize {
        self.min_participants
    }

    /// Participant and shape gates only; input values are not needed to decide them
    pub fn has_candidate_shape(&self, total_in: usize, total_out: usize) -> bool {
        total_in >= self.min_participants && total_in.checked_mul(2) == Some(total_out)
    }

    /// Classify a transaction. Never fails: no-match is an ordinary result.
    pub fn classify(&self, tx: &Transaction) -> ClassificationResult {
        let total_in = tx.input_count();
        let total_out = tx.output_count();

        if !self.has_candidate_shape(total_in, total_out) {
            return ClassificationResult::no_match(&tx.txid, tx.block_time, total_in, total_out);
        }

        let histogram = aggregate(&tx.outputs);
        let Some(amount) = histogram.first_with_count(total_in) else {
            return ClassificationResult::no_match(&tx.txid, tx.block_time, total_in, total_out);
        };

        let mut unable_to_spend = 0;
        let mut unresolved = 0;
        for input in &tx.inputs {
            match input.value_sat {
                Some(value) if value < amount => unable_to_spend += 1,
                Some(_) => {}
                None => unresolved += 1,
            }
        }

        ClassificationResult {
            txid: tx.txid.clone(),
            block_time: tx.block_time,
            input_count: total_in,
            output_count: total_out,
            is_match: true,
            matched_amount: Some(amount),
            occurrence_count: histogram.count(amount),
            participants_unable_to_spend: unable_to_spend,
            unresolved_inputs: unresolved,
        }
    }
}

/// Classify with the default participant threshold
pub fn classify(tx: &Transaction) -> ClassificationResult {
    ShuffleClassifier::default().classify(tx)
}
