//! Scan-to-pay intake.
//!
//! A camera decoder produces text; this module decides whether that text is
//! a payment request and, if so, pays it straight away. There is no
//! confirmation step between a valid scan and the payment call.

use crate::config::ControllerConfig;
use crate::invoker::MethodInvoker;
use crate::provider::{Operation, PaymentTarget, SendPaymentResponse};
use crate::status::{Severity, StatusBoard};
use crate::{Result, WeblnError};
use futures::{Stream, StreamExt};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// What `submit` did with a decoded string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanDisposition {
    /// Empty text; nothing happened.
    Ignored,
    /// Text failed the prefix check and was discarded.
    Rejected,
    /// Text was accepted and the payment was attempted.
    Paid(Result<SendPaymentResponse>),
}

/// Validates decoded text and feeds valid requests to the payment path.
pub struct ScanIntake {
    invoker: Rc<MethodInvoker>,
    status: Rc<StatusBoard>,
    prefix: String,
    open: Cell<bool>,
    target: RefCell<Option<PaymentTarget>>,
}

impl ScanIntake {
    pub fn new(
        invoker: Rc<MethodInvoker>,
        status: Rc<StatusBoard>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            invoker,
            status,
            prefix: config.payment_request_prefix.clone(),
            open: Cell::new(false),
            target: RefCell::new(None),
        }
    }

    /// Open the scan surface.
    pub fn open(&self) {
        self.open.set(true);
    }

    /// Close the scan surface.
    pub fn close(&self) {
        self.open.set(false);
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// The current payment target, whether typed or scanned.
    pub fn current_target(&self) -> Option<PaymentTarget> {
        self.target.borrow().clone()
    }

    /// Store a target typed by the user.
    pub fn set_manual_target(&self, text: impl Into<String>) {
        *self.target.borrow_mut() = Some(PaymentTarget::Request(text.into()));
    }

    /// Whether `text` starts with the payment-request prefix (case-sensitive).
    pub fn is_payment_request(&self, text: &str) -> bool {
        text.starts_with(&self.prefix)
    }

    /// Validate `decoded` and pay it when valid.
    pub async fn submit(&self, decoded: &str) -> ScanDisposition {
        if decoded.is_empty() {
            return ScanDisposition::Ignored;
        }

        if !self.is_payment_request(decoded) {
            let err = WeblnError::invalid_input(
                "scanned code",
                format!("not a Lightning payment request (expected '{}' prefix)", self.prefix),
            );
            tracing::warn!(error = %err, "scanned code rejected");
            self.status.show_transient(
                format!("Invalid QR code: {}", err.message()),
                Severity::Error,
            );
            self.invoker.record_rejection(Operation::SendPayment, &err);
            return ScanDisposition::Rejected;
        }

        let target = PaymentTarget::request(decoded);
        *self.target.borrow_mut() = Some(target.clone());
        self.close();
        tracing::debug!("scanned payment request accepted; paying");
        ScanDisposition::Paid(self.invoker.send_payment(&target).await)
    }

    /// Open the surface and submit the first non-empty text `decoded` yields.
    ///
    /// The stream is consumed once, so the surface is closed afterwards
    /// whatever the text turned out to be.
    pub async fn scan<S>(&self, decoded: S) -> ScanDisposition
    where
        S: Stream<Item = String>,
    {
        self.open();
        let mut decoded = std::pin::pin!(decoded.filter(|text| {
            let keep = !text.is_empty();
            async move { keep }
        }));
        match decoded.next().await {
            Some(text) => {
                let disposition = self.submit(&text).await;
                self.close();
                disposition
            }
            None => {
                self.close();
                ScanDisposition::Ignored
            }
        }
    }
}
