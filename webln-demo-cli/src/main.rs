//! WebLN Demo CLI
//!
//! Command-line interface for exercising the WebLN wallet controller.

use anyhow::Result;
use clap::Parser;
use webln_demo_cli::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("webln_demo_cli=debug,webln_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("webln_demo_cli=info,webln_lib=warn")
            .init();
    }

    let storage_dir = webln_demo_cli::storage_dir(cli.storage_dir.clone());

    // Wallet tasks are single-threaded and spawned locally.
    tokio::task::LocalSet::new()
        .run_until(webln_demo_cli::run(cli, &storage_dir))
        .await
}
