//! Bitcoin Core verbose JSON records
//!
//! Only the fields the scanner reads are modelled; everything else in the
//! response is ignored. A missing required field fails deserialisation and
//! surfaces as a malformed record.

use crate::errors::{SourceError, SourceResult};
use crate::types::{Transaction, TxInput, TxOutput};
use serde::{Deserialize, Serialize};

/// `getrawtransaction <txid> true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    pub vin: Vec<RawInput>,
    pub vout: Vec<RawOutput>,
    /// Absent for mempool transactions
    #[serde(default)]
    pub blocktime: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    /// Present only on coinbase inputs
    #[serde(default)]
    pub coinbase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Amount in BTC
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: Option<RawScriptPubKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
    /// Pre-v22 nodes report a list instead of `address`
    #[serde(default)]
    pub addresses: Option<Vec<String>>,
}

/// `getblockheader <hash> true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlockHeader {
    pub hash: String,
    pub height: u64,
    pub time: i64,
    pub mediantime: i64,
    #[serde(default)]
    pub nextblockhash: Option<String>,
}

/// `getblock <hash> 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub hash: String,
    pub time: i64,
    pub tx: Vec<String>,
}

impl RawInput {
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }

    /// Spent outpoint, or a malformed-record error if a non-coinbase input lacks one
    pub fn outpoint(&self, txid: &str) -> SourceResult<Option<(&str, u32)>> {
        if self.is_coinbase() {
            return Ok(None);
        }
        match (&self.txid, self.vout) {
            (Some(prev_txid), Some(prev_vout)) => Ok(Some((prev_txid.as_str(), prev_vout))),
            _ => Err(SourceError::malformed(txid, "input missing txid/vout")),
        }
    }
}

impl RawOutput {
    pub fn address(&self) -> Option<String> {
        let script = self.script_pub_key.as_ref()?;
        script
            .address
            .clone()
            .or_else(|| script.addresses.as_ref()?.first().cloned())
    }
}

impl RawTransaction {
    /// Value in BTC of output `vout`, if it exists
    pub fn output_value(&self, vout: u32) -> Option<f64> {
        self.vout.iter().find(|out| out.n == vout).map(|out| out.value)
    }

    /// Build the domain transaction; `input_values[i]` is the resolved value of input `i`
    pub fn into_transaction(self, input_values: &[Option<u64>]) -> SourceResult<Transaction> {
        let block_time = self
            .blocktime
            .ok_or_else(|| SourceError::malformed(&self.txid, "missing blocktime"))?;

        let mut inputs = Vec::with_capacity(self.vin.len());
        for (i, input) in self.vin.iter().enumerate() {
            let value_sat = input_values.get(i).copied().flatten();
            inputs.push(match input.outpoint(&self.txid)? {
                Some((prev_txid, prev_vout)) => TxInput {
                    prev_txid: Some(prev_txid.to_string()),
                    prev_vout: Some(prev_vout),
                    value_sat,
                },
                None => TxInput {
                    prev_txid: None,
                    prev_vout: None,
                    value_sat: None,
                },
            });
        }

        let outputs = self
            .vout
            .iter()
            .map(|out| TxOutput {
                value_btc: out.value,
                address: out.address(),
            })
            .collect();

        let tx = Transaction {
            txid: self.txid,
            inputs,
            outputs,
            block_time,
        };
        tx.validate()?;
        Ok(tx)
    }
}
