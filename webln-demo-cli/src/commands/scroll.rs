//! Replay a scroll-event timeline through auto-pay.

use anyhow::Result;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use webln_lib::prelude::*;

use super::{report, SimulatedWallet};
use crate::ui;

/// Fire one scroll signal at each offset in `events_ms` (relative to the
/// start), then wait for in-flight payments to finish.
pub async fn run(wallet: &SimulatedWallet, events_ms: &[u64]) -> Result<()> {
    let controller = &wallet.controller;
    let autopay = controller.autopay();

    ui::header("Scroll Auto-Pay");
    ui::key_value("Mode", &autopay.mode().to_string());
    ui::key_value(
        "Cooldown",
        &format!("{} ms", controller.config().cooldown_ms),
    );
    autopay.set_enabled(true);

    let start = Instant::now();
    let mut dispatched = 0usize;
    for &at in events_ms {
        sleep_until(start + Duration::from_millis(at)).await;
        let decision = autopay.on_signal();
        if decision == SignalDecision::Dispatched {
            dispatched += 1;
        }
        ui::key_value(&format!("t={}ms", at), &format!("{:?}", decision).to_lowercase());
    }

    // Spawned triggers may still be waiting out the settlement delay.
    if dispatched > 0 {
        let grace = match autopay.mode() {
            AutoPayMode::Direct => Duration::from_millis(50),
            AutoPayMode::InvoiceThenPay => {
                controller.config().settlement_delay() + Duration::from_millis(100)
            }
        };
        sleep(grace).await;
    }

    ui::separator();
    ui::key_value("Signals", &events_ms.len().to_string());
    ui::key_value("Triggers", &dispatched.to_string());
    ui::key_value(
        "Payments attempted",
        &wallet.mock.calls_for(Operation::SendPayment).len().to_string(),
    );
    if let Some(message) = controller.status().transient() {
        ui::status(&message);
    }
    report(controller);
    Ok(())
}
