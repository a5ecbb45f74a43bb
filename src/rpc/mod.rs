//! Bitcoin Core RPC integration module
//!
//! - **Client** - Async Bitcoin Core RPC client implementing `ChainSource`
//! - **Headers** - Block-time window lookup over the header chain
//! - **Cache** - Bounded previous-transaction cache for input resolution
//! - **Timeout** - `spawn_blocking` + timeout wrappers for sync RPC calls
//! - **Types** - Verbose JSON records returned by the node
//!
//! The RPC client uses the `corepc-client` crate and implements an async
//! worker pattern with channel-based request/response handling.

pub mod cache;
pub mod client;
pub mod headers;
pub mod timeout;
pub mod types;

// Re-export main types
pub use cache::{CacheStats, TransactionCache};
pub use client::{BitcoinRpcClient, RpcRequest};
pub use headers::{block_hashes_in_window, HeaderLookup, MEDIAN_TIME_MARGIN_SECONDS};
pub use timeout::{execute_with_timeout, run_blocking};
pub use types::{RawBlock, RawBlockHeader, RawTransaction};
