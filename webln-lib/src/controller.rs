//! One-stop wiring of the controller parts.
//!
//! Hosts (the browser bindings, the terminal demo) build a single
//! [`WalletController`] and reach the session, invoker, auto-payer and scan
//! intake through it. All parts share one scheduler and one status board.

use crate::autopay::ScrollAutoPayer;
use crate::config::ControllerConfig;
use crate::invoker::MethodInvoker;
use crate::provider::ProviderDiscovery;
use crate::scan::ScanIntake;
use crate::scheduler::Scheduler;
use crate::session::{ProviderSession, SessionState, PROVIDER_NOT_FOUND};
use crate::status::{Severity, StatusBoard};
use crate::Result;
use std::rc::Rc;

/// The assembled controller.
pub struct WalletController {
    config: ControllerConfig,
    session: Rc<ProviderSession>,
    status: Rc<StatusBoard>,
    invoker: Rc<MethodInvoker>,
    autopay: Rc<ScrollAutoPayer>,
    scan: ScanIntake,
}

impl WalletController {
    /// Build a disconnected controller. Fails if `config` is invalid.
    pub fn new(config: ControllerConfig, scheduler: Rc<dyn Scheduler>) -> Result<Self> {
        config.validate()?;

        let session = Rc::new(ProviderSession::new());
        let status = StatusBoard::new(Rc::clone(&scheduler), config.status_clear());
        let invoker = Rc::new(MethodInvoker::new(
            Rc::clone(&session),
            Rc::clone(&scheduler),
            Rc::clone(&status),
        ));
        let autopay = ScrollAutoPayer::new(
            Rc::clone(&invoker),
            Rc::clone(&status),
            scheduler,
            &config,
        );
        let scan = ScanIntake::new(Rc::clone(&invoker), Rc::clone(&status), &config);

        Ok(Self {
            config,
            session,
            status,
            invoker,
            autopay,
            scan,
        })
    }

    /// Acquire the wallet. A failure is shown as a persistent error.
    pub async fn connect(&self, discovery: &dyn ProviderDiscovery) -> SessionState {
        let state = self.session.acquire(discovery).await;
        if let SessionState::Unavailable { .. } = state {
            self.status.show_persistent(PROVIDER_NOT_FOUND, Severity::Error);
        }
        state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session(&self) -> &Rc<ProviderSession> {
        &self.session
    }

    pub fn status(&self) -> &Rc<StatusBoard> {
        &self.status
    }

    pub fn invoker(&self) -> &Rc<MethodInvoker> {
        &self.invoker
    }

    pub fn autopay(&self) -> &Rc<ScrollAutoPayer> {
        &self.autopay
    }

    pub fn scan(&self) -> &ScanIntake {
        &self.scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockDiscovery, MockWalletProvider};
    use crate::scheduler::TokioScheduler;
    use tokio::task::LocalSet;

    #[tokio::test(start_paused = true)]
    async fn test_missing_wallet_shows_persistent_error() {
        LocalSet::new()
            .run_until(async {
                let controller = WalletController::new(
                    ControllerConfig::default(),
                    Rc::new(TokioScheduler::new()),
                )
                .unwrap();

                let state = controller.connect(&MockDiscovery::missing()).await;
                assert!(matches!(state, SessionState::Unavailable { .. }));
                let message = controller.status().persistent().unwrap();
                assert_eq!(message.text, PROVIDER_NOT_FOUND);
                assert_eq!(message.severity, Severity::Error);

                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                assert!(controller.status().persistent().is_some());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_connected_controller_has_no_persistent_error() {
        LocalSet::new()
            .run_until(async {
                let controller = WalletController::new(
                    ControllerConfig::default(),
                    Rc::new(TokioScheduler::new()),
                )
                .unwrap();
                let discovery = MockDiscovery::found(Rc::new(MockWalletProvider::new()));

                assert_eq!(controller.connect(&discovery).await, SessionState::Connected);
                assert!(controller.status().persistent().is_none());
                assert!(!controller.autopay().is_enabled());
            })
            .await;
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = ControllerConfig::default().with_autopay_amount_sats(0);
        let result = WalletController::new(config, Rc::new(TokioScheduler::new()));
        assert!(result.is_err());
    }
}
