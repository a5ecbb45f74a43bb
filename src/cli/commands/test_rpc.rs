use crate::cli::commands::{load_config, RpcArgs};
use crate::errors::{AppError, AppResult};
use crate::processor::ConfigValidator;
use clap::Args;
use tracing::{error, info};

/// Test Bitcoin RPC connectivity
#[derive(Args)]
pub struct TestRpcCommand {
    #[command(flatten)]
    rpc: RpcArgs,
}

impl TestRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing Bitcoin RPC Connection ===");

        let mut rpc_config = load_config()?.bitcoin_rpc;
        self.rpc.apply(&mut rpc_config);
        ConfigValidator::validate_rpc_config(&rpc_config)?;

        info!("Testing connection to: {}", rpc_config.url);
        info!("Username: {}", rpc_config.username);

        match crate::rpc::BitcoinRpcClient::new(rpc_config).await {
            Ok(client) => {
                info!("RPC connection successful!");

                // Round-trip through the worker as well
                match client.test_connection().await {
                    Ok(()) => {
                        println!("Bitcoin RPC connection test PASSED");
                        println!(
                            "Worker running with {} concurrent requests",
                            client.get_concurrent_limit()
                        );
                    }
                    Err(e) => {
                        error!("RPC connection test failed: {}", e);
                        return Err(AppError::Config(format!("RPC test failed: {}", e)));
                    }
                }
            }
            Err(e) => {
                error!("Failed to create RPC client: {}", e);
                println!("Bitcoin RPC connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Check that Bitcoin Core is running");
                println!("2. Verify the RPC URL is correct");
                println!("3. Ensure RPC credentials are valid");
                println!("4. Check that RPC server is enabled in bitcoin.conf");
                println!("5. Scans need txindex=1 to look up arbitrary transactions");

                return Err(AppError::Config(format!(
                    "RPC client creation failed: {}",
                    e
                )));
            }
        }

        Ok(())
    }
}
