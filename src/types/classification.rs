use serde::{Deserialize, Serialize};

/// Outcome of running the shuffle heuristic over one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub txid: String,
    pub block_time: i64,
    pub input_count: usize,
    pub output_count: usize,
    pub is_match: bool,
    /// Repeated output amount in satoshis (matches only)
    pub matched_amount: Option<u64>,
    /// Number of outputs carrying `matched_amount`; equals `input_count` on a match
    pub occurrence_count: usize,
    /// Inputs whose resolved value is below `matched_amount`
    pub participants_unable_to_spend: usize,
    /// Inputs whose value the source could not resolve
    pub unresolved_inputs: usize,
}

impl ClassificationResult {
    pub fn no_match(txid: &str, block_time: i64, input_count: usize, output_count: usize) -> Self {
        Self {
            txid: txid.to_string(),
            block_time,
            input_count,
            output_count,
            is_match: false,
            matched_amount: None,
            occurrence_count: 0,
            participants_unable_to_spend: 0,
            unresolved_inputs: 0,
        }
    }

    /// Every participant could have funded the shuffle amount.
    ///
    /// Unresolved inputs cannot be vouched for, so they clear the flag too.
    pub fn is_valid(&self) -> bool {
        self.is_match && self.participants_unable_to_spend == 0 && self.unresolved_inputs == 0
    }
}
