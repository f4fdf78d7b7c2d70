//! WebLN Demo CLI
//!
//! Drives the wallet controller from the terminal against a simulated
//! wallet, one subcommand per operation.

pub mod cli;
pub mod commands;
pub mod ui;

use anyhow::Result;
use std::path::{Path, PathBuf};
use webln_lib::config::ControllerConfig;

use cli::{Cli, Commands};
use commands::WalletOptions;

/// Resolve the storage directory: flag, then `WEBLN_DEMO_DIR`, then the
/// platform config directory.
pub fn storage_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("WEBLN_DEMO_DIR").map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("webln-demo")
        })
}

/// Run one command. Must be called inside a `LocalSet`.
pub async fn run(cli: Cli, storage_dir: &Path) -> Result<()> {
    let options = WalletOptions {
        reject: cli.reject,
        unsupported: cli.unsupported,
        no_wallet: cli.no_wallet,
    };

    let mut config = ControllerConfig::from_env()?;
    if let Commands::Scroll {
        mode: Some(mode), ..
    } = &cli.command
    {
        config = config.with_autopay_mode(*mode);
    }

    if let Commands::Theme { action } = cli.command {
        commands::theme::run(storage_dir, action)?;
        return Ok(());
    }

    let wallet = commands::connect(&options, config).await?;
    match cli.command {
        Commands::Info => commands::wallet::info(&wallet).await,
        Commands::Balance => commands::wallet::balance(&wallet).await,
        Commands::Transactions => commands::wallet::transactions(&wallet).await,
        Commands::Invoice { amount, memo, qr } => {
            commands::wallet::invoice(&wallet, amount, memo, qr).await
        }
        Commands::Pay { target } => commands::wallet::pay(&wallet, &target).await,
        Commands::PayAsync { target } => commands::wallet::pay_async(&wallet, &target).await,
        Commands::Keysend {
            pubkey,
            amount,
            records,
        } => commands::wallet::keysend(&wallet, &pubkey, amount, records).await,
        Commands::Scroll { events, .. } => commands::scroll::run(&wallet, &events).await,
        Commands::Scan { text } => commands::scan::run(&wallet, &text).await,
        Commands::Theme { .. } => Ok(()),
    }
}
