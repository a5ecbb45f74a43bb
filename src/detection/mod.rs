//! Shuffle detection logic
//!
//! Pure functions over a fetched `Transaction`: no I/O, no logging. The
//! traversal feeds transactions in and routes results to a report sink.

pub mod aggregator;
pub mod classifier;

// Re-export for convenience
pub use aggregator::{aggregate, AmountHistogram};
pub use classifier::{classify, ShuffleClassifier, DEFAULT_MIN_PARTICIPANTS};
