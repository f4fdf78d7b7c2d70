//! Submit decoded QR text as if it came from the camera.

use anyhow::{bail, Result};
use webln_lib::prelude::*;

use super::{finish, report, SimulatedWallet};
use crate::ui;

pub async fn run(wallet: &SimulatedWallet, text: &str) -> Result<()> {
    let intake = wallet.controller.scan();
    ui::header("Scan to Pay");
    intake.open();

    match intake.submit(text).await {
        ScanDisposition::Ignored => {
            intake.close();
            ui::warning("Nothing was scanned");
            Ok(())
        }
        ScanDisposition::Rejected => {
            intake.close();
            if let Some(message) = wallet.controller.status().transient() {
                ui::status(&message);
            }
            report(&wallet.controller);
            bail!("scanned text is not a Lightning payment request")
        }
        ScanDisposition::Paid(result) => {
            let response = finish(wallet, result)?;
            ui::key_value("Preimage", &response.preimage);
            Ok(())
        }
    }
}
