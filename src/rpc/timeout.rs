//! Timeout wrapper for blocking RPC operations
//!
//! The sync `corepc-client` blocks the calling thread, so every call runs on
//! `spawn_blocking` under a `tokio::time::timeout`.

use crate::errors::{RpcError, RpcResult};
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

/// Execute a blocking RPC operation with timeout wrapper
///
/// # Returns
/// `Result<Result<RpcResult<T>, JoinError>, Elapsed>`
/// - Outer Result: Timeout result (Err = timeout elapsed)
/// - Middle Result: spawn_blocking result (Err = task panic/failure)
/// - Inner RpcResult<T>: RPC operation result
///
/// # Example
/// ```no_run
/// use coinshuffle_scan::rpc::execute_with_timeout;
/// use coinshuffle_scan::errors::RpcResult;
///
/// async fn example() -> RpcResult<String> {
///     match execute_with_timeout(30, move || -> RpcResult<String> {
///         // Your blocking RPC call here
///         Ok("result".to_string())
///     }).await {
///         Ok(Ok(Ok(result))) => Ok(result),
///         Ok(Ok(Err(e))) => Err(e),
///         Ok(Err(_)) => panic!("Task panicked"),
///         Err(_) => panic!("Timeout"),
///     }
/// }
/// ```
pub async fn execute_with_timeout<T, F>(
    timeout_seconds: u64,
    operation: F,
) -> Result<Result<RpcResult<T>, JoinError>, Elapsed>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    timeout(
        Duration::from_secs(timeout_seconds),
        tokio::task::spawn_blocking(operation),
    )
    .await
}

/// Same as `execute_with_timeout`, flattened into a single `RpcResult`
pub async fn run_blocking<T, F>(timeout_seconds: u64, operation: &str, f: F) -> RpcResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    match execute_with_timeout(timeout_seconds, f).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(RpcError::CallFailed {
            method: "spawn_blocking".to_string(),
            message: format!("Task execution error in {}: {}", operation, e),
        }),
        Err(_) => Err(RpcError::Timeout {
            timeout_seconds,
            operation: operation.to_string(),
        }),
    }
}
