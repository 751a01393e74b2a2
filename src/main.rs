use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = sentry_bootstrap::cli::Cli::parse();
    if let Err(e) = sentry_bootstrap::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
