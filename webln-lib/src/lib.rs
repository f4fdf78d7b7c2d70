//! WebLN wallet controller.
//!
//! Mediates between a page and an injected Lightning wallet provider: it
//! acquires the provider once, dispatches wallet operations while tracking
//! the latest outcome, turns a stream of scroll signals into rate-limited
//! micro-payments, and pays scanned payment requests.
//!
//! Everything here is single-threaded. Shared parts are reference counted
//! and the provider traits are `?Send`, matching a browser event loop.
//! Hosts supply the wallet through [`provider::ProviderDiscovery`] and the
//! clock and task runner through [`scheduler::Scheduler`].
//!
//! # Example
//!
//! Status messages clear themselves on spawned tasks, so on tokio the
//! controller runs inside a [`LocalSet`](tokio::task::LocalSet).
//!
//! ```
//! use std::rc::Rc;
//! use tokio::task::LocalSet;
//! use webln_lib::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> webln_lib::Result<()> {
//!     LocalSet::new()
//!         .run_until(async {
//!             let controller = WalletController::new(
//!                 ControllerConfig::default(),
//!                 Rc::new(TokioScheduler::new()),
//!             )?;
//!             let mock = Rc::new(MockWalletProvider::new());
//!             controller.connect(&MockDiscovery::found(mock)).await;
//!
//!             let invoice = controller
//!                 .invoker()
//!                 .make_invoice(&InvoiceRequest::for_amount(10))
//!                 .await?;
//!             assert!(invoice.payment_request.starts_with("lnbc"));
//!             Ok::<_, WeblnError>(())
//!         })
//!         .await
//! }
//! ```

pub mod autopay;
pub mod config;
pub mod controller;
pub mod errors;
pub mod invoker;
pub mod preferences;
pub mod prelude;
pub mod provider;
pub mod render;
pub mod scan;
pub mod scheduler;
pub mod session;
pub mod status;

pub use autopay::{ScrollAutoPayer, SignalDecision, ThrottleState};
pub use config::{AutoPayMode, ControllerConfig};
pub use controller::WalletController;
pub use errors::{ErrorKind, WeblnError};
pub use invoker::{MethodInvoker, MethodOutcome, OutcomePayload};
pub use scan::{ScanDisposition, ScanIntake};
pub use session::{ProviderSession, SessionState};
pub use status::{Severity, StatusBoard, StatusMessage};

/// Common result alias for controller operations.
pub type Result<T> = std::result::Result<T, WeblnError>;
