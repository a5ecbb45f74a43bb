pub mod check_tx;
pub mod scan;
pub mod test_rpc;
pub mod windows;

use crate::config::{AppConfig, BitcoinRpcConfig};
use crate::errors::{AppError, AppResult};
use clap::Args;
use tracing::{info, warn};

/// Bitcoin Core connection flags shared by commands that talk to a node
#[derive(Args, Debug, Clone, Default)]
pub struct RpcArgs {
    /// Bitcoin RPC URL (overrides config.toml)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Bitcoin RPC username (overrides config.toml)
    #[arg(long)]
    pub rpc_username: Option<String>,

    /// Bitcoin RPC password (overrides config.toml)
    #[arg(long)]
    pub rpc_password: Option<String>,

    /// Concurrent RPC requests limit (overrides config.toml)
    #[arg(long)]
    pub concurrent_requests: Option<usize>,
}

impl RpcArgs {
    pub fn apply(&self, rpc_config: &mut BitcoinRpcConfig) {
        if let Some(url) = &self.rpc_url {
            rpc_config.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            rpc_config.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            rpc_config.password = password.clone();
        }
        if let Some(concurrent) = self.concurrent_requests {
            rpc_config.concurrent_requests = concurrent;
        }
    }
}

/// Load configuration from file/environment, falling back to defaults
pub fn load_config() -> AppResult<AppConfig> {
    match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            Ok(config)
        }
        Err(e) => {
            warn!("Failed to load configuration: {}", e);
            info!("Using defaults and CLI arguments");
            AppConfig::get_defaults().map_err(|e| AppError::Config(e.to_string()))
        }
    }
}
