use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid scan plan or settings; raised before any traversal starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bitcoin RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Chain data source lookups that could not be skipped
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to Bitcoin Core RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// RPC method call failed (covers network errors, authentication, etc.)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// RPC returned unexpected or malformed response data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Block or transaction does not exist on the node
    #[error("Not found: {target}")]
    NotFound { target: String },
}

/// Per-item lookup failures raised by a chain data source.
///
/// All variants are recoverable: the traversal logs them with the hash or txid
/// and skips the item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Source unreachable or returned an error for a single hash/id
    #[error("Fetch failed for {target}: {message}")]
    Fetch { target: String, message: String },

    /// Hash or id resolves to nothing
    #[error("Not found: {target}")]
    NotFound { target: String },

    /// Record is missing expected fields or carries impossible values
    #[error("Malformed record {target}: {reason}")]
    Malformed { target: String, reason: String },

    /// Lookup did not complete within the configured timeout
    #[error("Timed out after {timeout_seconds}s fetching {target}")]
    Timeout { target: String, timeout_seconds: u64 },
}

impl SourceError {
    pub fn fetch(target: impl Into<String>, message: impl ToString) -> Self {
        SourceError::Fetch {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn not_found(target: impl Into<String>) -> Self {
        SourceError::NotFound {
            target: target.into(),
        }
    }

    pub fn malformed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Malformed {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Translate an RPC failure for `target` into the source taxonomy
    pub fn from_rpc(target: &str, err: RpcError) -> Self {
        match err {
            RpcError::NotFound { .. } => SourceError::not_found(target),
            RpcError::Timeout {
                timeout_seconds, ..
            } => SourceError::Timeout {
                target: target.to_string(),
                timeout_seconds,
            },
            RpcError::DeserialisationFailed(reason) | RpcError::InvalidResponse(reason) => {
                SourceError::malformed(target, reason)
            }
            other => SourceError::fetch(target, other),
        }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Result type for chain data source lookups
pub type SourceResult<T> = Result<T, SourceError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
