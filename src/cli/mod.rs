use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// CoinShuffle candidate scanner
#[derive(Parser)]
#[command(name = "coinshuffle-scan")]
#[command(about = "Scan Bitcoin history for CoinShuffle-style mixing transactions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a time range window by window (Bitcoin Core or JSON snapshot)
    Scan(commands::scan::ScanCommand),
    /// Classify specific transactions by id
    CheckTx(commands::check_tx::CheckTxCommand),
    /// Print the window plan for the configured range
    Windows(commands::windows::WindowsCommand),
    /// Test Bitcoin RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // Logs go to stderr so stdout carries only the report.
    // Uses RUST_LOG environment variable (defaults to "info" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(command) => command.run().await,
        Commands::CheckTx(command) => command.run().await,
        Commands::Windows(command) => command.run(),
        Commands::TestRpc(command) => command.run().await,
    }
}
