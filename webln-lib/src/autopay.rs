//! Scroll-driven micro-payments.
//!
//! Scroll events arrive far faster than anyone wants to pay, so each signal
//! is checked against a cooldown window measured from the last *accepted*
//! trigger. The decision is made synchronously when the signal arrives; the
//! payment itself runs as its own task and reports through the invoker.
//!
//! The cooldown clock is independent of the enabled flag: switching
//! auto-pay off and on again does not reset it.

use crate::config::{AutoPayMode, ControllerConfig};
use crate::invoker::MethodInvoker;
use crate::provider::{InvoiceRequest, PaymentTarget, SendPaymentResponse};
use crate::scheduler::Scheduler;
use crate::status::{Severity, StatusBoard};
use crate::Result;
use futures::FutureExt;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Timestamp of the last accepted trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThrottleState {
    last_trigger_ms: Option<u64>,
}

impl ThrottleState {
    pub fn last_trigger_ms(&self) -> Option<u64> {
        self.last_trigger_ms
    }

    /// Accept `now_ms` if more than `window_ms` has elapsed since the last
    /// accepted trigger. The first trigger is always accepted.
    ///
    /// A clock reading earlier than the stored timestamp counts as zero
    /// elapsed time, so the stored value never decreases.
    pub fn try_trigger(&mut self, now_ms: u64, window_ms: u64) -> bool {
        if let Some(last) = self.last_trigger_ms {
            if now_ms.saturating_sub(last) <= window_ms {
                return false;
            }
        }
        self.last_trigger_ms = Some(now_ms);
        true
    }
}

/// What happened to one raw signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalDecision {
    /// Auto-pay is switched off.
    Disabled,
    /// No wallet connected.
    Disconnected,
    /// Inside the cooldown window.
    Throttled,
    /// A trigger payment was started.
    Dispatched,
}

/// Converts scroll signals into rate-limited payments.
pub struct ScrollAutoPayer {
    invoker: Rc<MethodInvoker>,
    status: Rc<StatusBoard>,
    scheduler: Rc<dyn Scheduler>,
    enabled: Cell<bool>,
    mode: Cell<AutoPayMode>,
    throttle: Cell<ThrottleState>,
    cooldown_ms: u64,
    settlement_delay: Duration,
    amount_sats: u64,
    memo: String,
}

impl ScrollAutoPayer {
    /// Create a disabled auto-payer.
    pub fn new(
        invoker: Rc<MethodInvoker>,
        status: Rc<StatusBoard>,
        scheduler: Rc<dyn Scheduler>,
        config: &ControllerConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            invoker,
            status,
            scheduler,
            enabled: Cell::new(false),
            mode: Cell::new(config.autopay_mode),
            throttle: Cell::new(ThrottleState::default()),
            cooldown_ms: config.cooldown_ms,
            settlement_delay: config.settlement_delay(),
            amount_sats: config.autopay_amount_sats,
            memo: config.autopay_memo.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Switch auto-pay on or off. In-flight triggers are not cancelled.
    pub fn set_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "auto-pay toggled");
        self.enabled.set(enabled);
    }

    pub fn mode(&self) -> AutoPayMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: AutoPayMode) {
        self.mode.set(mode);
    }

    pub fn throttle_state(&self) -> ThrottleState {
        self.throttle.get()
    }

    /// Handle one raw signal, spawning the payment flow if accepted.
    pub fn on_signal(self: &Rc<Self>) -> SignalDecision {
        let decision = self.decide();
        if decision == SignalDecision::Dispatched {
            let payer = Rc::clone(self);
            self.scheduler.spawn(
                async move {
                    let _ = payer.run_trigger().await;
                }
                .boxed_local(),
            );
        }
        decision
    }

    /// Handle one raw signal, running an accepted payment flow to completion.
    pub async fn handle_signal(&self) -> SignalDecision {
        let decision = self.decide();
        if decision == SignalDecision::Dispatched {
            let _ = self.run_trigger().await;
        }
        decision
    }

    fn decide(&self) -> SignalDecision {
        if !self.enabled.get() {
            return SignalDecision::Disabled;
        }
        if !self.invoker.session().is_connected() {
            return SignalDecision::Disconnected;
        }

        let now = self.scheduler.now_ms();
        let mut throttle = self.throttle.get();
        let accepted = throttle.try_trigger(now, self.cooldown_ms);
        self.throttle.set(throttle);

        if accepted {
            tracing::debug!(now_ms = now, mode = %self.mode.get(), "auto-pay trigger accepted");
            SignalDecision::Dispatched
        } else {
            tracing::trace!(now_ms = now, "auto-pay signal throttled");
            SignalDecision::Throttled
        }
    }

    async fn run_trigger(&self) -> Result<SendPaymentResponse> {
        let result = match self.mode.get() {
            AutoPayMode::Direct => {
                self.invoker
                    .send_payment(&PaymentTarget::amount(self.amount_sats, self.memo.clone()))
                    .await
            }
            AutoPayMode::InvoiceThenPay => self.invoice_then_pay().await,
        };

        match &result {
            Ok(_) => self.status.show_transient(
                format!(
                    "Auto-payment of {} {} sent successfully!",
                    self.amount_sats,
                    if self.amount_sats == 1 { "sat" } else { "sats" }
                ),
                Severity::Success,
            ),
            Err(err) => self.status.show_transient(
                format!("Auto-payment failed: {}", err.message()),
                Severity::Error,
            ),
        }
        result
    }

    // A payment failure after the invoice exists leaves that invoice unpaid.
    async fn invoice_then_pay(&self) -> Result<SendPaymentResponse> {
        let invoice = self
            .invoker
            .make_invoice(&InvoiceRequest::new(self.amount_sats, self.memo.clone()))
            .await?;
        self.scheduler.sleep(self.settlement_delay).await;
        self.invoker
            .send_payment(&PaymentTarget::request(invoice.payment_request))
            .await
    }
}
