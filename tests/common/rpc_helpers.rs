//! Bitcoin RPC Test Utilities and Configuration
//!
//! Tests that would need a live node skip themselves when none is reachable.

use coinshuffle_scan::config::BitcoinRpcConfig;
use coinshuffle_scan::rpc::BitcoinRpcClient;

/// Standard test RPC URL (localhost)
pub const TEST_RPC_URL: &str = "http://localhost:8332";

pub const TEST_RPC_USERNAME: &str = "bitcoin";

pub const TEST_RPC_PASSWORD: &str = "bitcoin";

/// Create standard Bitcoin RPC configuration for tests
pub fn create_test_rpc_config() -> BitcoinRpcConfig {
    BitcoinRpcConfig {
        url: TEST_RPC_URL.to_string(),
        username: TEST_RPC_USERNAME.to_string(),
        password: TEST_RPC_PASSWORD.to_string(),
        timeout_seconds: 30,
        concurrent_requests: 4,
        cache_capacity: 1_000,
    }
}

/// Create a test Bitcoin RPC client, or an error if no node is reachable
pub async fn create_test_rpc_client() -> Result<BitcoinRpcClient, String> {
    let config = create_test_rpc_config();
    BitcoinRpcClient::new(config)
        .await
        .map_err(|e| format!("Failed to create RPC client: {}", e))
}
