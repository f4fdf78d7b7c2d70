//! Controller configuration.
//!
//! Every timing constant and auto-pay parameter lives here with its
//! default. Embedders normally use [`ControllerConfig::default`]; the
//! builder setters and [`ControllerConfig::from_env`] exist for demos and
//! tests.
//!
//! # Environment Variables
//!
//! - `WEBLN_COOLDOWN_MS` - Minimum gap between accepted scroll triggers (default: 1000)
//! - `WEBLN_SETTLEMENT_DELAY_MS` - Wait between invoice and payment in invoice-then-pay mode (default: 1000)
//! - `WEBLN_STATUS_CLEAR_MS` - Lifetime of transient status messages (default: 3000)
//! - `WEBLN_AUTOPAY_AMOUNT_SATS` - Amount per auto-payment (default: 1)
//! - `WEBLN_AUTOPAY_MODE` - `direct` or `invoice-then-pay` (default: direct)

use crate::{Result, WeblnError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How an accepted scroll trigger turns into a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoPayMode {
    /// One fixed-amount payment handed straight to the provider.
    #[default]
    Direct,
    /// Create an invoice, wait for settlement bookkeeping, then pay it.
    InvoiceThenPay,
}

impl AutoPayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::InvoiceThenPay => "invoice-then-pay",
        }
    }
}

impl fmt::Display for AutoPayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoPayMode {
    type Err = WeblnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "invoice-then-pay" | "invoice" => Ok(Self::InvoiceThenPay),
            other => Err(WeblnError::Configuration(format!(
                "unknown auto-pay mode '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the wallet controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Minimum elapsed time between accepted scroll triggers.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Delay between invoice creation and payment in invoice-then-pay mode.
    #[serde(default = "default_settlement_delay_ms")]
    pub settlement_delay_ms: u64,

    /// How long transient status messages stay visible.
    #[serde(default = "default_status_clear_ms")]
    pub status_clear_ms: u64,

    /// Amount paid per accepted trigger.
    #[serde(default = "default_autopay_amount_sats")]
    pub autopay_amount_sats: u64,

    /// Memo attached to auto-payments.
    #[serde(default = "default_autopay_memo")]
    pub autopay_memo: String,

    #[serde(default)]
    pub autopay_mode: AutoPayMode,

    /// Literal prefix a scanned payment request must start with.
    #[serde(default = "default_payment_request_prefix")]
    pub payment_request_prefix: String,
}

fn default_cooldown_ms() -> u64 {
    1000
}

fn default_settlement_delay_ms() -> u64 {
    1000
}

fn default_status_clear_ms() -> u64 {
    3000
}

fn default_autopay_amount_sats() -> u64 {
    1
}

fn default_autopay_memo() -> String {
    "Auto-payment on scroll".to_string()
}

fn default_payment_request_prefix() -> String {
    "lnbc".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            settlement_delay_ms: default_settlement_delay_ms(),
            status_clear_ms: default_status_clear_ms(),
            autopay_amount_sats: default_autopay_amount_sats(),
            autopay_memo: default_autopay_memo(),
            autopay_mode: AutoPayMode::default(),
            payment_request_prefix: default_payment_request_prefix(),
        }
    }
}

impl ControllerConfig {
    /// Set the auto-pay cooldown.
    pub fn with_cooldown_ms(mut self, ms: u64) -> Self {
        self.cooldown_ms = ms;
        self
    }

    /// Set the invoice settlement delay.
    pub fn with_settlement_delay_ms(mut self, ms: u64) -> Self {
        self.settlement_delay_ms = ms;
        self
    }

    /// Set the transient status lifetime.
    pub fn with_status_clear_ms(mut self, ms: u64) -> Self {
        self.status_clear_ms = ms;
        self
    }

    /// Set the auto-pay mode.
    pub fn with_autopay_mode(mut self, mode: AutoPayMode) -> Self {
        self.autopay_mode = mode;
        self
    }

    /// Set the auto-pay amount.
    pub fn with_autopay_amount_sats(mut self, sats: u64) -> Self {
        self.autopay_amount_sats = sats;
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn settlement_delay(&self) -> Duration {
        Duration::from_millis(self.settlement_delay_ms)
    }

    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.autopay_amount_sats == 0 {
            return Err(WeblnError::Configuration(
                "auto-pay amount must be at least 1 sat".to_string(),
            ));
        }
        if self.payment_request_prefix.is_empty() {
            return Err(WeblnError::Configuration(
                "payment request prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Defaults overlaid with `WEBLN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values found by `lookup`; unset keys keep their current value.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_u64(&lookup, "WEBLN_COOLDOWN_MS")? {
            self.cooldown_ms = ms;
        }
        if let Some(ms) = parse_u64(&lookup, "WEBLN_SETTLEMENT_DELAY_MS")? {
            self.settlement_delay_ms = ms;
        }
        if let Some(ms) = parse_u64(&lookup, "WEBLN_STATUS_CLEAR_MS")? {
            self.status_clear_ms = ms;
        }
        if let Some(sats) = parse_u64(&lookup, "WEBLN_AUTOPAY_AMOUNT_SATS")? {
            self.autopay_amount_sats = sats;
        }
        if let Some(mode) = lookup("WEBLN_AUTOPAY_MODE") {
            self.autopay_mode = mode.parse()?;
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| WeblnError::Configuration(format!("{}: {}", key, e))),
    }
}
