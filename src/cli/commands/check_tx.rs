use crate::cli::commands::{load_config, RpcArgs};
use crate::detection::ShuffleClassifier;
use crate::errors::AppResult;
use crate::processor::ConfigValidator;
use crate::report::{ConsoleReporter, ReportSink};
use crate::rpc::BitcoinRpcClient;
use crate::source::{ChainSource, InMemoryChainSource};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

/// Classify specific transactions by id
#[derive(Args)]
pub struct CheckTxCommand {
    /// Transaction ids to check
    #[arg(required = true)]
    txids: Vec<String>,

    /// Look transactions up in a JSON chain snapshot instead of Bitcoin Core
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Minimum inputs for a transaction to be considered (overrides config.toml)
    #[arg(long)]
    min_participants: Option<usize>,

    #[command(flatten)]
    rpc: RpcArgs,
}

impl CheckTxCommand {
    pub async fn run(&self) -> AppResult<()> {
        let mut app_config = load_config()?;
        if let Some(min) = self.min_participants {
            app_config.classifier.min_participants = min;
        }
        ConfigValidator::validate_classifier_config(&app_config.classifier)?;
        let classifier = ShuffleClassifier::new(app_config.classifier.min_participants);

        match &self.snapshot {
            Some(path) => {
                let source = InMemoryChainSource::from_json_file(path)?;
                check_transactions(&source, &classifier, &self.txids).await
            }
            None => {
                self.rpc.apply(&mut app_config.bitcoin_rpc);
                ConfigValidator::validate_rpc_config(&app_config.bitcoin_rpc)?;
                let client = BitcoinRpcClient::new(app_config.bitcoin_rpc).await?;
                check_transactions(&client, &classifier, &self.txids).await
            }
        }
    }
}

/// Fetch and classify each id in turn; lookup failures are reported and skipped
pub async fn check_transactions<S: ChainSource>(
    source: &S,
    classifier: &ShuffleClassifier,
    txids: &[String],
) -> AppResult<()> {
    let mut reporter = ConsoleReporter::stdout();
    let mut matches = 0usize;

    for txid in txids {
        let tx = match source.transaction(txid).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!("TX id {} not checked: {}", txid, e);
                println!("[TX id: {}] not checked: {}", txid, e);
                continue;
            }
        };

        let result = classifier.classify(&tx);
        if result.is_match {
            matches += 1;
            reporter.match_found(&result)?;
        } else {
            println!(
                "[TX id: {}] No CoinShuffle pattern (Ins: {} Outs: {})",
                txid, result.input_count, result.output_count
            );
        }
    }

    info!("Checked {} transactions, {} matches", txids.len(), matches);
    Ok(())
}
