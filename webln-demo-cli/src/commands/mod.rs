//! CLI command implementations

pub mod scan;
pub mod scroll;
pub mod theme;
pub mod wallet;

use anyhow::Result;
use serde::Serialize;
use std::rc::Rc;
use webln_lib::prelude::*;

use crate::ui;

/// How the simulated wallet should behave for this run.
#[derive(Clone, Debug, Default)]
pub struct WalletOptions {
    pub reject: Vec<Operation>,
    pub unsupported: Vec<Operation>,
    pub no_wallet: bool,
}

/// A controller connected (or not) to the simulated wallet.
pub struct SimulatedWallet {
    pub controller: WalletController,
    pub mock: Rc<MockWalletProvider>,
}

/// Build the controller and run discovery against the simulated wallet.
pub async fn connect(options: &WalletOptions, config: ControllerConfig) -> Result<SimulatedWallet> {
    let scheduler: Rc<dyn Scheduler> = Rc::new(TokioScheduler::new());

    let mut mock = MockWalletProvider::new()
        .with_alias("webln-demo-wallet")
        .with_scheduler(Rc::clone(&scheduler));
    for op in &options.reject {
        mock = mock.rejecting(*op, ProviderRejection::user_rejected("User rejected the request"));
    }
    for op in &options.unsupported {
        mock = mock.without(*op);
    }
    let mock = Rc::new(mock);

    let controller = WalletController::new(config, scheduler)?;
    let discovery = if options.no_wallet {
        MockDiscovery::missing()
    } else {
        MockDiscovery::found(mock.clone())
    };

    match controller.connect(&discovery).await {
        SessionState::Connected => tracing::debug!("simulated wallet connected"),
        _ => {
            if let Some(message) = controller.status().persistent() {
                ui::status(&message);
            }
        }
    }

    Ok(SimulatedWallet { controller, mock })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    active_operation: Option<Operation>,
    last_outcome: Option<MethodOutcome>,
}

/// Print the active operation and the last outcome.
pub fn report(controller: &WalletController) {
    let invoker = controller.invoker();
    ui::header("Controller state");
    ui::json(&Report {
        active_operation: invoker.active_operation(),
        last_outcome: invoker.last_outcome(),
    });
}

/// Surface the status message and controller state, then hand back `result`.
pub fn finish<T>(wallet: &SimulatedWallet, result: webln_lib::Result<T>) -> Result<T> {
    if let Some(message) = wallet.controller.status().transient() {
        ui::status(&message);
    }
    report(&wallet.controller);
    Ok(result?)
}
