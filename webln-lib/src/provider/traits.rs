//! Wallet Provider Traits
//!
//! The wallet provider is an injected capability object: the controller never
//! sees how a wallet talks to the Lightning network, only the operations
//! below. Not every provider implements every operation, so callers ask
//! [`WalletProvider::supports`] before invoking.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ MethodInvoker                                 │
//! │  ┌──────────────────────────────────────────┐ │
//! │  │ Rc<dyn WalletProvider>                   │ │
//! │  │  - BrowserWalletProvider (window.webln)  │ │
//! │  │  - MockWalletProvider (tests, CLI demo)  │ │
//! │  └──────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Futures are `?Send`: the controller runs on one logical thread and the
//! browser handle cannot cross threads anyway.

use super::types::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeInfo, Operation,
    PaymentTarget, SendPaymentAsyncResponse, SendPaymentResponse, Transaction,
};
use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;

/// Failure category reported by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionCategory {
    /// A human declined the approval prompt.
    UserRejected,
    /// The provider does not implement the call.
    Unsupported,
    /// Anything else (routing failure, invalid amount, ...).
    Other,
}

impl RejectionCategory {
    /// Best-effort classification of a free-form provider message.
    ///
    /// Injected wallets reject with plain `Error` objects, so the category
    /// has to be recovered from the message text.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("not supported")
            || lower.contains("not implemented")
            || lower.contains("is not a function")
        {
            Self::Unsupported
        } else if lower.contains("reject")
            || lower.contains("declin")
            || lower.contains("denied")
            || lower.contains("cancel")
            || lower.contains("prompt was closed")
        {
            Self::UserRejected
        } else {
            Self::Other
        }
    }
}

/// A provider-side rejection, message preserved for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRejection {
    pub category: RejectionCategory,
    pub message: String,
}

impl ProviderRejection {
    /// Create a rejection with an explicit category.
    pub fn new(category: RejectionCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    /// Create a rejection, classifying the category from the message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            category: RejectionCategory::classify(&message),
            message,
        }
    }

    /// The human declined.
    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(RejectionCategory::UserRejected, message)
    }

    /// The provider lacks the capability.
    pub fn unsupported(operation: Operation) -> Self {
        Self::new(
            RejectionCategory::Unsupported,
            format!("{} is not supported by this wallet", operation),
        )
    }
}

impl fmt::Display for ProviderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderRejection {}

/// Result alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderRejection>;

/// Capability interface of an injected Lightning wallet.
///
/// Each call may put an approval prompt in front of a human, so callers must
/// invoke it exactly once per user intent and never retry implicitly.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Whether this provider implements `operation`.
    fn supports(&self, operation: Operation) -> bool;

    /// Node/provider descriptor.
    async fn get_info(&self) -> ProviderResult<NodeInfo>;

    /// Wallet balance.
    async fn get_balance(&self) -> ProviderResult<Balance>;

    /// Recent transactions.
    async fn get_transactions(&self) -> ProviderResult<Vec<Transaction>>;

    /// Create an invoice.
    async fn make_invoice(&self, request: &InvoiceRequest) -> ProviderResult<Invoice>;

    /// Pay and wait for settlement.
    async fn send_payment(&self, target: &PaymentTarget) -> ProviderResult<SendPaymentResponse>;

    /// Pay without waiting for settlement.
    async fn send_payment_async(
        &self,
        target: &PaymentTarget,
    ) -> ProviderResult<SendPaymentAsyncResponse>;

    /// Spontaneous payment to a node public key.
    async fn keysend(&self, request: &KeysendRequest) -> ProviderResult<KeysendResponse>;
}

/// Acquisition seam for a wallet provider.
///
/// Implementations locate the injected wallet and ask it to enable itself.
/// On failure they return a human-readable cause.
#[async_trait(?Send)]
pub trait ProviderDiscovery {
    async fn request_provider(&self) -> Result<Rc<dyn WalletProvider>, String>;
}
