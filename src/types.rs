//! CoinShuffle Scanner - Type System
//!
//! - `transaction`: Transaction, input, output and block records
//! - `classification`: Per-transaction heuristic outcome
//! - `window`: Scan plan and half-open time windows
//! - `statistics`: Traversal summary and timing

mod classification;
mod transaction;
mod window;
pub mod statistics;

pub use classification::*;
pub use transaction::*;
pub use window::*;

pub use statistics::{StatisticsCollector, TraversalSummary};
