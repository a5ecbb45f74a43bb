//! Integration Tests Module
//!
//! End-to-end traversals over in-memory and snapshot-backed sources.

pub mod snapshot_replay;
pub mod traversal_failures;
