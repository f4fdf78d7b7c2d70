//! Single choke point for wallet capability calls.
//!
//! Every call goes through [`MethodInvoker`], which checks the session,
//! validates input locally, asks the provider whether it supports the
//! operation, invokes it exactly once and records the outcome.
//!
//! Calls are neither queued nor serialized. Two overlapping calls each write
//! the single outcome slot when they complete, so the call that *completes*
//! last is the one observers see.

use crate::errors::ErrorKind;
use crate::provider::{
    Balance, Invoice, InvoiceRequest, KeysendRequest, KeysendResponse, NodeInfo, Operation,
    PaymentTarget, ProviderResult, SendPaymentAsyncResponse, SendPaymentResponse, Transaction,
    WalletProvider,
};
use crate::scheduler::Scheduler;
use crate::session::ProviderSession;
use crate::status::{Severity, StatusBoard};
use crate::{Result, WeblnError};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

/// Typed success payload of a wallet call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum OutcomePayload {
    Info(NodeInfo),
    Balance(Balance),
    Transactions(Vec<Transaction>),
    Invoice(Invoice),
    Payment(SendPaymentResponse),
    AsyncPayment(SendPaymentAsyncResponse),
    Keysend(KeysendResponse),
}

/// Result of the most recent wallet call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        operation: Operation,
        payload: OutcomePayload,
        timestamp_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Failure {
        operation: Operation,
        error: ErrorKind,
        message: String,
        timestamp_ms: u64,
    },
}

impl MethodOutcome {
    /// The operation that produced this outcome.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Success { operation, .. } | Self::Failure { operation, .. } => *operation,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error kind for failures.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(*error),
        }
    }

    /// Success payload, if any.
    pub fn payload(&self) -> Option<&OutcomePayload> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Failure { .. } => None,
        }
    }
}

/// Dispatcher and outcome recorder for wallet calls.
pub struct MethodInvoker {
    session: Rc<ProviderSession>,
    scheduler: Rc<dyn Scheduler>,
    status: Rc<StatusBoard>,
    active_operation: Cell<Option<Operation>>,
    last_outcome: RefCell<Option<MethodOutcome>>,
    current_invoice: RefCell<Option<Invoice>>,
}

impl MethodInvoker {
    pub fn new(
        session: Rc<ProviderSession>,
        scheduler: Rc<dyn Scheduler>,
        status: Rc<StatusBoard>,
    ) -> Self {
        Self {
            session,
            scheduler,
            status,
            active_operation: Cell::new(None),
            last_outcome: RefCell::new(None),
            current_invoice: RefCell::new(None),
        }
    }

    /// The session this invoker dispatches through.
    pub fn session(&self) -> &Rc<ProviderSession> {
        &self.session
    }

    /// The most recently invoked operation.
    pub fn active_operation(&self) -> Option<Operation> {
        self.active_operation.get()
    }

    /// The most recently completed outcome.
    pub fn last_outcome(&self) -> Option<MethodOutcome> {
        self.last_outcome.borrow().clone()
    }

    /// The latest successfully created invoice.
    pub fn current_invoice(&self) -> Option<Invoice> {
        self.current_invoice.borrow().clone()
    }

    pub async fn get_info(&self) -> Result<NodeInfo> {
        self.dispatch(
            Operation::GetInfo,
            Ok(()),
            |provider| async move { provider.get_info().await },
            |info| OutcomePayload::Info(info.clone()),
        )
        .await
    }

    pub async fn get_balance(&self) -> Result<Balance> {
        self.dispatch(
            Operation::GetBalance,
            Ok(()),
            |provider| async move { provider.get_balance().await },
            |balance| OutcomePayload::Balance(balance.clone()),
        )
        .await
    }

    pub async fn get_transactions(&self) -> Result<Vec<Transaction>> {
        self.dispatch(
            Operation::GetTransactions,
            Ok(()),
            |provider| async move { provider.get_transactions().await },
            |transactions| OutcomePayload::Transactions(transactions.clone()),
        )
        .await
    }

    /// Create an invoice; on success it becomes the current invoice.
    pub async fn make_invoice(&self, request: &InvoiceRequest) -> Result<Invoice> {
        let invoice = self
            .dispatch(
                Operation::MakeInvoice,
                Ok(()),
                |provider| async move { provider.make_invoice(request).await },
                |invoice| OutcomePayload::Invoice(invoice.clone()),
            )
            .await?;
        *self.current_invoice.borrow_mut() = Some(invoice.clone());
        Ok(invoice)
    }

    pub async fn send_payment(&self, target: &PaymentTarget) -> Result<SendPaymentResponse> {
        self.dispatch(
            Operation::SendPayment,
            validate_target(target),
            |provider| async move { provider.send_payment(target).await },
            |response| OutcomePayload::Payment(response.clone()),
        )
        .await
    }

    pub async fn send_payment_async(
        &self,
        target: &PaymentTarget,
    ) -> Result<SendPaymentAsyncResponse> {
        self.dispatch(
            Operation::SendPaymentAsync,
            validate_target(target),
            |provider| async move { provider.send_payment_async(target).await },
            |response| OutcomePayload::AsyncPayment(response.clone()),
        )
        .await
    }

    pub async fn keysend(&self, request: &KeysendRequest) -> Result<KeysendResponse> {
        self.dispatch(
            Operation::Keysend,
            validate_keysend(request),
            |provider| async move { provider.keysend(request).await },
            |response| OutcomePayload::Keysend(response.clone()),
        )
        .await
    }

    #[tracing::instrument(skip_all, fields(operation = %operation))]
    async fn dispatch<T, F, Fut, W>(
        &self,
        operation: Operation,
        validation: Result<()>,
        call: F,
        wrap: W,
    ) -> Result<T>
    where
        F: FnOnce(Rc<dyn WalletProvider>) -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
        W: FnOnce(&T) -> OutcomePayload,
    {
        // Not connected: reject without touching any observable slot.
        let provider = match self.session.provider() {
            Ok(provider) => provider,
            Err(err) => {
                tracing::debug!("wallet call ignored: no provider");
                return Err(err);
            }
        };

        self.active_operation.set(Some(operation));

        if let Err(err) = validation {
            self.record_failure(operation, &err);
            return Err(err);
        }

        if !provider.supports(operation) {
            let err = WeblnError::UnsupportedOperation(operation.to_string());
            self.record_failure(operation, &err);
            return Err(err);
        }

        if let Some(text) = in_flight_message(operation) {
            self.status.show_transient(text, Severity::Info);
        }

        tracing::debug!("dispatching wallet call");
        match call(provider).await {
            Ok(value) => {
                self.record_success(operation, wrap(&value));
                Ok(value)
            }
            Err(rejection) => {
                let err = WeblnError::from_rejection(rejection.category, rejection.message);
                self.record_failure(operation, &err);
                Err(err)
            }
        }
    }

    /// Record a request rejected before it could be dispatched.
    ///
    /// Only the outcome slot changes; the active operation still names the
    /// last call that was actually invoked.
    pub fn record_rejection(&self, operation: Operation, err: &WeblnError) {
        *self.last_outcome.borrow_mut() = Some(MethodOutcome::Failure {
            operation,
            error: err.kind(),
            message: err.message(),
            timestamp_ms: self.scheduler.now_ms(),
        });
    }

    fn record_success(&self, operation: Operation, payload: OutcomePayload) {
        self.status
            .show_transient(success_message(&payload), Severity::Success);
        *self.last_outcome.borrow_mut() = Some(MethodOutcome::Success {
            operation,
            payload,
            timestamp_ms: self.scheduler.now_ms(),
        });
    }

    fn record_failure(&self, operation: Operation, err: &WeblnError) {
        tracing::warn!(kind = %err.kind(), error = %err, "wallet call failed");
        self.status.show_transient(
            format!("{}: {}", failure_prefix(operation), err.message()),
            Severity::Error,
        );
        *self.last_outcome.borrow_mut() = Some(MethodOutcome::Failure {
            operation,
            error: err.kind(),
            message: err.message(),
            timestamp_ms: self.scheduler.now_ms(),
        });
    }
}

fn validate_target(target: &PaymentTarget) -> Result<()> {
    match target {
        PaymentTarget::Request(value) if value.trim().is_empty() => Err(
            WeblnError::invalid_input("payment target", "must not be empty"),
        ),
        _ => Ok(()),
    }
}

fn validate_keysend(request: &KeysendRequest) -> Result<()> {
    if request.destination_pubkey.trim().is_empty() {
        return Err(WeblnError::invalid_input(
            "destination",
            "node public key must not be empty",
        ));
    }
    if let Some(key) = request
        .custom_records
        .keys()
        .find(|key| key.parse::<u64>().is_err())
    {
        return Err(WeblnError::invalid_input(
            "customRecords",
            format!("record type '{}' is not a decimal TLV type", key),
        ));
    }
    Ok(())
}

fn success_message(payload: &OutcomePayload) -> String {
    match payload {
        OutcomePayload::Info(info) => format!("Node info received: {}", info.node.alias),
        OutcomePayload::Balance(balance) => format!(
            "Balance: {} {}",
            balance.balance,
            balance.currency.as_deref().unwrap_or("sats")
        ),
        OutcomePayload::Transactions(transactions) => {
            format!("Loaded {} transactions", transactions.len())
        }
        OutcomePayload::Invoice(_) => "Invoice created".to_string(),
        OutcomePayload::Payment(response) => format!(
            "Payment sent successfully! Preimage: {}",
            response.preimage
        ),
        OutcomePayload::AsyncPayment(response) => format!(
            "Payment dispatched. Payment hash: {}",
            response.payment_hash
        ),
        OutcomePayload::Keysend(response) => format!(
            "Keysend payment sent successfully! Preimage: {}",
            response.preimage
        ),
    }
}

/// Shown while a payment is outstanding, until the outcome replaces it.
fn in_flight_message(operation: Operation) -> Option<&'static str> {
    match operation {
        Operation::SendPayment | Operation::SendPaymentAsync => Some("Processing payment..."),
        Operation::Keysend => Some("Processing keysend payment..."),
        _ => None,
    }
}

fn failure_prefix(operation: Operation) -> &'static str {
    match operation {
        Operation::GetInfo => "Failed to get node info",
        Operation::GetBalance => "Failed to get balance",
        Operation::GetTransactions => "Failed to get transactions",
        Operation::MakeInvoice => "Failed to create invoice",
        Operation::SendPayment | Operation::SendPaymentAsync => "Payment failed",
        Operation::Keysend => "Keysend payment failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockDiscovery, MockWalletProvider, ProviderRejection};
    use crate::scheduler::TokioScheduler;
    use std::time::Duration;
    use tokio::task::LocalSet;

    async fn connected(mock: Rc<MockWalletProvider>) -> MethodInvoker {
        let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());
        let session = Rc::new(ProviderSession::new());
        session.acquire(&MockDiscovery::found(mock)).await;
        let status = StatusBoard::new(scheduler.clone(), Duration::from_millis(3000));
        MethodInvoker::new(session, scheduler, status)
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_call_never_reaches_provider() {
        LocalSet::new()
            .run_until(async {
                let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());
                let session = Rc::new(ProviderSession::new());
                session.acquire(&MockDiscovery::missing()).await;
                let status = StatusBoard::new(scheduler.clone(), Duration::from_millis(3000));
                let invoker = MethodInvoker::new(session, scheduler, status);

                let err = invoker.get_info().await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
                assert!(invoker.active_operation().is_none());
                assert!(invoker.last_outcome().is_none());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_records_outcome() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new().with_alias("alice"));
                let invoker = connected(mock.clone()).await;

                let info = invoker.get_info().await.unwrap();
                assert_eq!(info.node.alias, "alice");
                assert_eq!(invoker.active_operation(), Some(Operation::GetInfo));

                let outcome = invoker.last_outcome().unwrap();
                assert!(outcome.is_success());
                assert_eq!(outcome.operation(), Operation::GetInfo);
                assert_eq!(mock.call_count(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_rejected_locally() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new());
                let invoker = connected(mock.clone()).await;

                let err = invoker
                    .send_payment(&PaymentTarget::request("   "))
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidInput);
                assert_eq!(mock.call_count(), 0);
                assert_eq!(invoker.active_operation(), Some(Operation::SendPayment));
                assert_eq!(
                    invoker.last_outcome().unwrap().error_kind(),
                    Some(ErrorKind::InvalidInput)
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_keysend_record_type_must_be_numeric() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new());
                let invoker = connected(mock.clone()).await;

                let request = KeysendRequest::new("02ab", 10).with_record("greeting", "hi");
                let err = invoker.keysend(&request).await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidInput);
                assert_eq!(mock.call_count(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_fails_fast() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new().without(Operation::GetTransactions));
                let invoker = connected(mock.clone()).await;

                let err = invoker.get_transactions().await.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
                assert_eq!(mock.call_count(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_maps_category_and_keeps_message() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new().rejecting(
                    Operation::SendPayment,
                    ProviderRejection::user_rejected("User rejected"),
                ));
                let invoker = connected(mock.clone()).await;

                let err = invoker
                    .send_payment(&PaymentTarget::request("lnbc10n1abc"))
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::UserRejected);
                match invoker.last_outcome().unwrap() {
                    MethodOutcome::Failure { message, error, .. } => {
                        assert_eq!(message, "User rejected");
                        assert_eq!(error, ErrorKind::UserRejected);
                    }
                    other => panic!("expected failure, got {:?}", other),
                }
                assert_eq!(mock.call_count(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_invoice_keeps_previous() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new());
                let invoker = connected(mock.clone()).await;
                let first = invoker
                    .make_invoice(&InvoiceRequest::for_amount(10))
                    .await
                    .unwrap();

                mock.reject_next(
                    Operation::MakeInvoice,
                    ProviderRejection::from_message("Invalid amount"),
                );
                let err = invoker
                    .make_invoice(&InvoiceRequest::for_amount(20))
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::ProviderFailure);
                assert_eq!(mock.calls_for(Operation::MakeInvoice).len(), 2);
                assert_eq!(invoker.current_invoice(), Some(first.clone()));
                assert!(!invoker.last_outcome().unwrap().is_success());

                // Unrelated calls do not disturb the stored invoice either.
                invoker.get_balance().await.unwrap();
                assert_eq!(invoker.current_invoice(), Some(first));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_invoice_replaces_current() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new());
                let invoker = connected(mock).await;
                invoker
                    .make_invoice(&InvoiceRequest::for_amount(10))
                    .await
                    .unwrap();
                let second = invoker
                    .make_invoice(&InvoiceRequest::for_amount(20))
                    .await
                    .unwrap();
                assert_eq!(invoker.current_invoice(), Some(second));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_status_while_payment_outstanding() {
        LocalSet::new()
            .run_until(async {
                let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());
                let mock = Rc::new(MockWalletProvider::new().with_scheduler(scheduler));
                mock.push_latency(Duration::from_millis(500));
                let invoker = Rc::new(connected(mock.clone()).await);

                let pending = tokio::task::spawn_local({
                    let invoker = invoker.clone();
                    async move {
                        invoker
                            .send_payment(&PaymentTarget::request("lnbc10n1abc"))
                            .await
                    }
                });
                tokio::time::sleep(Duration::from_millis(100)).await;

                let status = invoker.status.transient().unwrap();
                assert_eq!(status.severity, Severity::Info);
                assert_eq!(status.text, "Processing payment...");
                assert_eq!(mock.calls().len(), 1);
                assert!(invoker.last_outcome().is_none());

                pending.await.unwrap().unwrap();
                assert_eq!(
                    invoker.status.transient().unwrap().severity,
                    Severity::Success
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_status_for_keysend() {
        LocalSet::new()
            .run_until(async {
                let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());
                let mock = Rc::new(MockWalletProvider::new().with_scheduler(scheduler));
                mock.push_latency(Duration::from_millis(500));
                let invoker = Rc::new(connected(mock).await);

                let pending = tokio::task::spawn_local({
                    let invoker = invoker.clone();
                    async move { invoker.keysend(&KeysendRequest::new("02ab", 10)).await }
                });
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(
                    invoker.status.transient().unwrap().text,
                    "Processing keysend payment..."
                );
                pending.await.unwrap().unwrap();
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_show_no_processing_status() {
        LocalSet::new()
            .run_until(async {
                let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());
                let mock = Rc::new(
                    MockWalletProvider::new()
                        .with_balance(777)
                        .with_scheduler(scheduler),
                );
                mock.push_latency(Duration::from_millis(500));
                let invoker = Rc::new(connected(mock).await);

                let pending = tokio::task::spawn_local({
                    let invoker = invoker.clone();
                    async move { invoker.get_balance().await }
                });
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert!(invoker.status.transient().is_none());

                assert_eq!(pending.await.unwrap().unwrap().balance, 777);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_message_on_payment() {
        LocalSet::new()
            .run_until(async {
                let mock = Rc::new(MockWalletProvider::new());
                let invoker = connected(mock).await;
                let response = invoker
                    .send_payment(&PaymentTarget::request("lnbc10n1abc"))
                    .await
                    .unwrap();
                let status = invoker.status.transient().unwrap();
                assert_eq!(status.severity, Severity::Success);
                assert!(status.text.contains(&response.preimage));
            })
            .await;
    }

    #[test]
    fn test_outcome_serializes_for_observers() {
        let outcome = MethodOutcome::Failure {
            operation: Operation::Keysend,
            error: ErrorKind::UserRejected,
            message: "User rejected".to_string(),
            timestamp_ms: 42,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["operation"], "keysend");
        assert_eq!(json["error"], "UserRejected");
        assert_eq!(json["timestampMs"], 42);
    }
}
