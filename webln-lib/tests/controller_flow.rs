//! End-to-end controller flows against the simulated wallet.
//!
//! All tests run on a paused tokio clock inside a `LocalSet`, so the
//! cooldown, the settlement delay and the status auto-clear are exact.

mod common;

use common::{advance_ms, connected_controller, timed_mock};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use webln_lib::prelude::*;

#[tokio::test(start_paused = true)]
async fn test_scroll_signals_inside_cooldown_are_dropped() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;
            let autopay = controller.autopay();

            assert_eq!(autopay.handle_signal().await, SignalDecision::Dispatched);
            advance_ms(500).await;
            assert_eq!(autopay.handle_signal().await, SignalDecision::Throttled);
            assert_eq!(mock.calls_for(Operation::SendPayment).len(), 1);

            // Exactly one window after the first trigger is still inside it.
            advance_ms(500).await;
            assert_eq!(autopay.handle_signal().await, SignalDecision::Throttled);

            advance_ms(1).await;
            assert_eq!(autopay.handle_signal().await, SignalDecision::Dispatched);
            assert_eq!(mock.calls_for(Operation::SendPayment).len(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_direct_autopay_sends_fixed_amount() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            controller.autopay().handle_signal().await;

            let calls = mock.calls_for(Operation::SendPayment);
            assert_eq!(calls.len(), 1);
            assert_eq!(
                calls[0].argument.as_deref(),
                Some("1 sats (Auto-payment on scroll)")
            );
            assert!(mock.calls_for(Operation::MakeInvoice).is_empty());
            assert_eq!(
                controller.status().transient().unwrap().text,
                "Auto-payment of 1 sat sent successfully!"
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_toggling_autopay_keeps_cooldown() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;
            let autopay = controller.autopay();

            assert_eq!(autopay.handle_signal().await, SignalDecision::Dispatched);
            autopay.set_enabled(false);
            assert_eq!(autopay.handle_signal().await, SignalDecision::Disabled);

            advance_ms(200).await;
            autopay.set_enabled(true);
            assert_eq!(autopay.handle_signal().await, SignalDecision::Throttled);
            assert_eq!(mock.calls_for(Operation::SendPayment).len(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_controller_makes_no_calls() {
    LocalSet::new()
        .run_until(async {
            let controller = WalletController::new(
                ControllerConfig::default(),
                Rc::new(TokioScheduler::new()),
            )
            .unwrap();
            controller.connect(&MockDiscovery::missing()).await;
            controller.autopay().set_enabled(true);

            assert_eq!(
                controller.autopay().handle_signal().await,
                SignalDecision::Disconnected
            );
            let err = controller.invoker().get_balance().await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
            assert!(controller.invoker().active_operation().is_none());
            assert!(controller.invoker().last_outcome().is_none());
            assert!(controller.autopay().throttle_state().last_trigger_ms().is_none());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_invoice_then_pay_waits_for_settlement() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let config = ControllerConfig::default().with_autopay_mode(AutoPayMode::InvoiceThenPay);
            let controller = connected_controller(mock.clone(), config).await;

            assert_eq!(controller.autopay().on_signal(), SignalDecision::Dispatched);

            advance_ms(500).await;
            assert_eq!(mock.calls_for(Operation::MakeInvoice).len(), 1);
            assert!(mock.calls_for(Operation::SendPayment).is_empty());

            advance_ms(600).await;
            let invoice = mock.invoices().pop().unwrap();
            let payments = mock.calls_for(Operation::SendPayment);
            assert_eq!(payments.len(), 1);
            assert_eq!(
                payments[0].argument.as_deref(),
                Some(invoice.payment_request.as_str())
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_payment_leaves_invoice_unpaid() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new().rejecting(
                Operation::SendPayment,
                ProviderRejection::from_message("Insufficient balance"),
            ));
            let config = ControllerConfig::default().with_autopay_mode(AutoPayMode::InvoiceThenPay);
            let controller = connected_controller(mock.clone(), config).await;

            controller.autopay().handle_signal().await;

            assert_eq!(mock.invoices().len(), 1);
            let outcome = controller.invoker().last_outcome().unwrap();
            assert_eq!(outcome.operation(), Operation::SendPayment);
            assert_eq!(outcome.error_kind(), Some(ErrorKind::ProviderFailure));
            assert_eq!(
                controller.status().transient().unwrap().text,
                "Auto-payment failed: Insufficient balance"
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_make_invoice_with_default_memo() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let invoice = controller
                .invoker()
                .make_invoice(&InvoiceRequest::for_amount(10))
                .await
                .unwrap();

            assert!(invoice.payment_request.starts_with("lnbc"));
            let calls = mock.calls_for(Operation::MakeInvoice);
            assert_eq!(calls[0].argument.as_deref(), Some("Invoice for 10 sats"));
            assert_eq!(controller.invoker().current_invoice(), Some(invoice));
            assert_eq!(
                controller.invoker().active_operation(),
                Some(Operation::MakeInvoice)
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_keysend_with_custom_record() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let request = KeysendRequest::new(
                "02ab1a5fa8d0e3e1f8d2f5a6b2c7c5f0e3d7b6a9c8e4d1f2a3b4c5d6e7f8a9b0c1",
                10,
            )
            .with_record("696969", "Hello from WebLN!");
            let response = controller.invoker().keysend(&request).await.unwrap();

            assert!(!response.preimage.is_empty());
            assert_eq!(
                controller.invoker().active_operation(),
                Some(Operation::Keysend)
            );
            assert!(controller.invoker().last_outcome().unwrap().is_success());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_user_rejection_is_classified() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new().rejecting(
                Operation::SendPayment,
                ProviderRejection::from_message("User rejected the payment"),
            ));
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let err = controller
                .invoker()
                .send_payment(&PaymentTarget::request("lnbc10n1pabc"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UserRejected);
            assert_eq!(
                controller.status().transient().unwrap().text,
                "Payment failed: User rejected the payment"
            );

            // Still usable afterwards.
            assert!(controller.invoker().get_balance().await.is_ok());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_operation_is_not_forwarded() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new().without(Operation::Keysend));
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let err = controller
                .invoker()
                .keysend(&KeysendRequest::new("02ab", 10))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
            assert!(mock.calls_for(Operation::Keysend).is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_last_completed_call_owns_outcome() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(timed_mock());
            mock.push_latency(Duration::from_millis(500));
            mock.push_latency(Duration::from_millis(100));
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;
            let invoker = controller.invoker();

            let (balance, info) = futures::join!(invoker.get_balance(), invoker.get_info());
            assert!(balance.is_ok());
            assert!(info.is_ok());

            // getInfo was invoked last, getBalance completed last.
            assert_eq!(invoker.active_operation(), Some(Operation::GetInfo));
            assert_eq!(
                invoker.last_outcome().unwrap().operation(),
                Operation::GetBalance
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_failure_message_clears_itself() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::failing());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            assert!(controller.invoker().get_balance().await.is_err());
            let message = controller.status().transient().unwrap();
            assert_eq!(message.severity, Severity::Error);
            assert_eq!(message.text, "Failed to get balance: Simulated failure");

            advance_ms(2999).await;
            assert!(controller.status().transient().is_some());
            advance_ms(2).await;
            assert!(controller.status().transient().is_none());

            // The outcome slot is not cleared with the message.
            assert!(controller.invoker().last_outcome().is_some());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_scanned_request_is_paid_immediately() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let request = "lnbc10n1pscannedinvoice";
            let decoded = futures::stream::iter(vec![request.to_string()]);
            let disposition = controller.scan().scan(decoded).await;

            assert!(matches!(disposition, ScanDisposition::Paid(Ok(_))));
            let payments = mock.calls_for(Operation::SendPayment);
            assert_eq!(payments.len(), 1);
            assert_eq!(payments[0].argument.as_deref(), Some(request));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_invalid_scan_records_invalid_input() {
    LocalSet::new()
        .run_until(async {
            let mock = Rc::new(MockWalletProvider::new());
            let controller = connected_controller(mock.clone(), ControllerConfig::default()).await;

            let disposition = controller.scan().submit("bitcoin:bc1qexample").await;

            assert_eq!(disposition, ScanDisposition::Rejected);
            assert_eq!(mock.call_count(), 0);
            assert_eq!(
                controller.invoker().last_outcome().unwrap().error_kind(),
                Some(ErrorKind::InvalidInput)
            );
            assert!(controller
                .status()
                .transient()
                .unwrap()
                .text
                .starts_with("Invalid QR code"));
        })
        .await;
}
