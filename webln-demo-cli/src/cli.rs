//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webln_lib::config::AutoPayMode;
use webln_lib::provider::Operation;

#[derive(Parser, Debug)]
#[command(name = "webln-demo")]
#[command(about = "WebLN Demo CLI - Drive the wallet controller against a simulated wallet", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom storage directory (can also be set via WEBLN_DEMO_DIR env var)
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Make the simulated wallet decline an operation (repeatable)
    #[arg(long, global = true, value_parser = parse_operation)]
    pub reject: Vec<Operation>,

    /// Make the simulated wallet lack an operation (repeatable)
    #[arg(long, global = true, value_parser = parse_operation)]
    pub unsupported: Vec<Operation>,

    /// Behave as if no wallet were installed
    #[arg(long, global = true)]
    pub no_wallet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show node info
    Info,

    /// Show wallet balance
    Balance,

    /// List wallet transactions
    Transactions,

    /// Create an invoice
    Invoice {
        /// Amount in sats
        #[arg(short, long, default_value_t = 10)]
        amount: u64,

        /// Memo (defaults to "Invoice for N sats")
        #[arg(short, long)]
        memo: Option<String>,

        /// Also print the invoice as a QR code
        #[arg(long)]
        qr: bool,
    },

    /// Pay a payment request
    Pay {
        /// Payment request or address
        target: String,
    },

    /// Pay without waiting for settlement
    PayAsync {
        /// Payment request or address
        target: String,
    },

    /// Send a keysend payment to a node
    Keysend {
        /// Destination node public key
        pubkey: String,

        /// Amount in sats
        #[arg(short, long, default_value_t = 10)]
        amount: u64,

        /// Custom TLV record as TYPE=VALUE (repeatable)
        #[arg(short, long = "record", value_parser = parse_record)]
        records: Vec<(String, String)>,
    },

    /// Replay scroll events through auto-pay
    Scroll {
        /// Event times in milliseconds from start, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        events: Vec<u64>,

        /// direct or invoice
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<AutoPayMode>,
    },

    /// Submit decoded QR text as if scanned
    Scan {
        /// Decoded text
        text: String,
    },

    /// Show or change the display mode
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    /// Show the current mode
    Show,
    /// Flip between light and dark
    Toggle,
    /// Switch to dark mode
    Dark,
    /// Switch to light mode
    Light,
}

/// Parse a WebLN method name such as `sendPayment`.
pub fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::parse(s).ok_or_else(|| {
        let known: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
        format!("unknown operation '{}' (expected one of {})", s, known.join(", "))
    })
}

/// Parse a `TYPE=VALUE` custom record.
pub fn parse_record(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("record '{}' is not TYPE=VALUE", s))?;
    if key.is_empty() {
        return Err(format!("record '{}' has an empty type", s));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn parse_mode(s: &str) -> Result<AutoPayMode, String> {
    s.parse().map_err(|e: webln_lib::WeblnError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "webln-demo",
            "pay",
            "lnbc10n1p",
            "--reject",
            "sendPayment",
            "--unsupported",
            "keysend",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.reject, vec![Operation::SendPayment]);
        assert_eq!(cli.unsupported, vec![Operation::Keysend]);
        assert!(matches!(cli.command, Commands::Pay { ref target } if target == "lnbc10n1p"));
    }

    #[test]
    fn test_parse_scroll_events() {
        let cli =
            Cli::try_parse_from(["webln-demo", "scroll", "--events", "0,500,1200", "--mode", "invoice"])
                .unwrap();
        match cli.command {
            Commands::Scroll { events, mode } => {
                assert_eq!(events, vec![0, 500, 1200]);
                assert_eq!(mode, Some(AutoPayMode::InvoiceThenPay));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_keysend_records() {
        let cli = Cli::try_parse_from([
            "webln-demo",
            "keysend",
            "02ab",
            "--amount",
            "21",
            "--record",
            "696969=Hello",
            "--record",
            "7629169=podcast",
        ])
        .unwrap();
        match cli.command {
            Commands::Keysend {
                pubkey,
                amount,
                records,
            } => {
                assert_eq!(pubkey, "02ab");
                assert_eq!(amount, 21);
                assert_eq!(records.len(), 2);
                assert_eq!(records[0], ("696969".to_string(), "Hello".to_string()));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invoice_defaults() {
        let cli = Cli::try_parse_from(["webln-demo", "invoice"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Invoice {
                amount: 10,
                memo: None,
                qr: false
            }
        ));
    }

    #[test]
    fn test_unknown_operation_is_refused() {
        assert!(Cli::try_parse_from(["webln-demo", "--reject", "payAll", "info"]).is_err());
    }

    #[test]
    fn test_theme_action_optional() {
        let cli = Cli::try_parse_from(["webln-demo", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Theme { action: None }));
        let cli = Cli::try_parse_from(["webln-demo", "theme", "toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Theme {
                action: Some(ThemeAction::Toggle)
            }
        ));
    }
}
