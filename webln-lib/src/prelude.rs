//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use webln_lib::prelude::*;
//! ```

// Controller parts
pub use crate::autopay::{ScrollAutoPayer, SignalDecision};
pub use crate::controller::WalletController;
pub use crate::invoker::{MethodInvoker, MethodOutcome, OutcomePayload};
pub use crate::scan::{ScanDisposition, ScanIntake};
pub use crate::session::{ProviderSession, SessionState};
pub use crate::status::{Severity, StatusBoard, StatusMessage};

// Configuration
pub use crate::config::{AutoPayMode, ControllerConfig};

// Error handling
pub use crate::errors::{ErrorKind, WeblnError};
pub use crate::Result;

// Provider contract and wire types
pub use crate::provider::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeInfo, Operation,
    PaymentTarget, ProviderDiscovery, ProviderRejection, ProviderResult, RejectionCategory,
    SendPaymentAsyncResponse, SendPaymentResponse, Transaction, WalletProvider,
};

// Simulated wallet
pub use crate::provider::{MockDiscovery, MockWalletProvider};

// Scheduling
pub use crate::scheduler::Scheduler;
#[cfg(not(target_arch = "wasm32"))]
pub use crate::scheduler::TokioScheduler;

// Display preference
pub use crate::preferences::{DisplayMode, DisplayPreference, PreferenceStore};
