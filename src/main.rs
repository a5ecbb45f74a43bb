#[tokio::main]
async fn main() {
    if let Err(e) = coinshuffle_scan::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
