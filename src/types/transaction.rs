//! Transaction and block records as seen by the classifier

use crate::errors::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};

/// A transaction with its inputs resolved to prior output values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Block inclusion time (seconds since epoch)
    pub block_time: i64,
}

/// Transaction input spending a prior output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Absent for coinbase inputs
    #[serde(default)]
    pub prev_txid: Option<String>,
    #[serde(default)]
    pub prev_vout: Option<u32>,
    /// Value of the spent output in satoshis; `None` when the source could not resolve it
    #[serde(default)]
    pub value_sat: Option<u64>,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount in BTC, exactly as the source record carries it
    pub value_btc: f64,
    #[serde(default)]
    pub address: Option<String>,
}

/// Block detail needed by the traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: String,
    pub time: i64,
    pub txids: Vec<String>,
}

impl Transaction {
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Reject records a classifier cannot reason about.
    ///
    /// Sources call this when converting their wire records so that broken data
    /// surfaces as `SourceError::Malformed` instead of a silent default.
    pub fn validate(&self) -> SourceResult<()> {
        if self.txid.trim().is_empty() {
            return Err(SourceError::malformed("<unknown>", "missing txid"));
        }
        if self.block_time < 0 {
            return Err(SourceError::malformed(
                &self.txid,
                format!("negative block time {}", self.block_time),
            ));
        }
        for (n, output) in self.outputs.iter().enumerate() {
            if !output.value_btc.is_finite() || output.value_btc < 0.0 {
                return Err(SourceError::malformed(
                    &self.txid,
                    format!("output {} has invalid value {}", n, output.value_btc),
                ));
            }
        }
        Ok(())
    }
}

impl TxInput {
    pub fn resolved(prev_txid: &str, prev_vout: u32, value_sat: u64) -> Self {
        Self {
            prev_txid: Some(prev_txid.to_string()),
            prev_vout: Some(prev_vout),
            value_sat: Some(value_sat),
        }
    }

    pub fn unresolved(prev_txid: &str, prev_vout: u32) -> Self {
        Self {
            prev_txid: Some(prev_txid.to_string()),
            prev_vout: Some(prev_vout),
            value_sat: None,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.prev_txid.is_none()
    }
}

impl TxOutput {
    pub fn new(value_btc: f64) -> Self {
        Self {
            value_btc,
            address: None,
        }
    }
}
