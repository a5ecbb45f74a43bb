//! CoinShuffle candidate scanner
//!
//! Walks a block chain window by window and flags transactions whose outputs
//! repeat one amount once per input, with twice as many outputs as inputs.

pub mod cli;
pub mod config;
pub mod detection;
pub mod errors;
pub mod processor;
pub mod report;
pub mod rpc;
pub mod source;
pub mod types;
pub mod utils;
