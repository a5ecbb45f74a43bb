//! Block-time window lookup over the header chain
//!
//! A block belongs to a window when its header `time` falls in `[start, end)`.
//! Header time is not monotonic, so the walk is bounded with median time past:
//!
//! - it starts at the first height whose `mediantime` is at least
//!   `start - MEDIAN_TIME_MARGIN_SECONDS`
//! - it stops after the first block whose `mediantime` reaches `end`, because
//!   every later block has `time > mediantime >= end`
//!
//! Each header lookup is a separate node call with its own timeout.

use crate::errors::RpcResult;
use crate::rpc::types::RawBlockHeader;
use crate::types::TimeWindow;
use async_trait::async_trait;

/// Slack between a block's header time and its median time past
pub const MEDIAN_TIME_MARGIN_SECONDS: i64 = 7200;

/// Header access needed to list a window's blocks
#[async_trait]
pub trait HeaderLookup: Send + Sync {
    /// Height of the best block
    async fn tip_height(&self) -> RpcResult<u64>;

    async fn header_at_height(&self, height: u64) -> RpcResult<RawBlockHeader>;

    async fn header_by_hash(&self, hash: &str) -> RpcResult<RawBlockHeader>;
}

/// First height whose median time past is at or after `target`, or `tip + 1`.
///
/// Median time past never decreases with height, so a binary search is exact.
pub async fn first_height_at_or_after<L>(lookup: &L, target: i64, tip: u64) -> RpcResult<u64>
where
    L: HeaderLookup + ?Sized,
{
    let mut lo = 0u64;
    let mut hi = tip + 1;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let header = lookup.header_at_height(mid).await?;
        if header.mediantime < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

/// Hashes of blocks whose header time falls inside `window`, in height order
pub async fn block_hashes_in_window<L>(lookup: &L, window: TimeWindow) -> RpcResult<Vec<String>>
where
    L: HeaderLookup + ?Sized,
{
    let tip = lookup.tip_height().await?;
    let walk_from = window.start.saturating_sub(MEDIAN_TIME_MARGIN_SECONDS);
    let first = first_height_at_or_after(lookup, walk_from, tip).await?;
    if first > tip {
        return Ok(Vec::new());
    }

    let mut hashes = Vec::new();
    let mut header = lookup.header_at_height(first).await?;
    loop {
        if window.contains(header.time) {
            hashes.push(header.hash.clone());
        }
        if header.mediantime >= window.end {
            break;
        }
        match header.nextblockhash.take() {
            Some(next) => header = lookup.header_by_hash(&next).await?,
            None => break,
        }
    }
    Ok(hashes)
}
