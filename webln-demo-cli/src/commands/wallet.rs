//! One command per wallet operation.

use anyhow::Result;
use webln_lib::prelude::*;

use super::{finish, SimulatedWallet};
use crate::ui;

/// Record the page has always attached to keysend payments.
pub const DEFAULT_KEYSEND_RECORD: (&str, &str) = ("696969", "Hello from Lightning WebLN Demo!");

pub async fn info(wallet: &SimulatedWallet) -> Result<()> {
    ui::header("Node Info");
    let info = finish(wallet, wallet.controller.invoker().get_info().await)?;

    ui::key_value("Alias", &info.node.alias);
    if let Some(pubkey) = &info.node.pubkey {
        ui::key_value("Public key", pubkey);
    }
    if let Some(color) = &info.node.color {
        ui::key_value("Color", color);
    }
    ui::key_value("Methods", &info.methods.join(", "));
    Ok(())
}

pub async fn balance(wallet: &SimulatedWallet) -> Result<()> {
    ui::header("Balance");
    let balance = finish(wallet, wallet.controller.invoker().get_balance().await)?;
    ui::key_value(
        "Balance",
        &format!(
            "{} {}",
            balance.balance,
            balance.currency.as_deref().unwrap_or("sats")
        ),
    );
    Ok(())
}

pub async fn transactions(wallet: &SimulatedWallet) -> Result<()> {
    ui::header("Transactions");
    let transactions = finish(wallet, wallet.controller.invoker().get_transactions().await)?;

    if transactions.is_empty() {
        ui::info("No transactions yet");
        return Ok(());
    }
    for tx in &transactions {
        ui::separator();
        ui::key_value("Type", &tx.direction);
        ui::key_value("Amount", &format!("{} sats", tx.amount));
        if let Some(hash) = &tx.payment_hash {
            ui::key_value("Payment hash", hash);
        }
    }
    Ok(())
}

pub async fn invoice(
    wallet: &SimulatedWallet,
    amount: u64,
    memo: Option<String>,
    qr: bool,
) -> Result<()> {
    ui::header("Create Invoice");
    let request = match memo {
        Some(memo) => InvoiceRequest::new(amount, memo),
        None => InvoiceRequest::for_amount(amount),
    };
    ui::key_value("Amount", &format!("{} sats", request.amount_sats));
    ui::key_value("Memo", &request.memo);

    let invoice = finish(wallet, wallet.controller.invoker().make_invoice(&request).await)?;
    ui::key_value("Payment request", &invoice.payment_request);
    if qr {
        ui::qr_code(&invoice.payment_request)?;
    }
    Ok(())
}

pub async fn pay(wallet: &SimulatedWallet, target: &str) -> Result<()> {
    ui::header("Send Payment");
    let spinner = ui::spinner("Processing payment...");
    let result = wallet
        .controller
        .invoker()
        .send_payment(&PaymentTarget::request(target))
        .await;
    spinner.finish_and_clear();

    let response = finish(wallet, result)?;
    ui::key_value("Preimage", &response.preimage);
    Ok(())
}

pub async fn pay_async(wallet: &SimulatedWallet, target: &str) -> Result<()> {
    ui::header("Send Payment (async)");
    let response = finish(
        wallet,
        wallet
            .controller
            .invoker()
            .send_payment_async(&PaymentTarget::request(target))
            .await,
    )?;
    ui::key_value("Payment hash", &response.payment_hash);
    Ok(())
}

pub async fn keysend(
    wallet: &SimulatedWallet,
    pubkey: &str,
    amount: u64,
    records: Vec<(String, String)>,
) -> Result<()> {
    ui::header("Keysend Payment");
    let mut request = KeysendRequest::new(pubkey, amount);
    if records.is_empty() {
        let (key, value) = DEFAULT_KEYSEND_RECORD;
        request = request.with_record(key, value);
    }
    for (key, value) in records {
        request = request.with_record(key, value);
    }

    let spinner = ui::spinner("Processing keysend payment...");
    let result = wallet.controller.invoker().keysend(&request).await;
    spinner.finish_and_clear();

    let response = finish(wallet, result)?;
    ui::key_value("Preimage", &response.preimage);
    Ok(())
}
