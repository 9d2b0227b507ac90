use clap::Parser;
use pr_digest::cli::{run, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let command = cli.command.name();
    tracing::info!(command, "pr-digest starting");

    match run(cli).await {
        Ok(()) => {
            tracing::info!(command, "pr-digest finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(command, error = %e, "pr-digest failed");
            // Full cause chain.
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
