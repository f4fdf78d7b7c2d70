//! Shared fixtures for controller integration tests.

#![allow(dead_code)]

use std::rc::Rc;
use webln_lib::prelude::*;

/// A controller connected to `mock`, with auto-pay switched on.
pub async fn connected_controller(
    mock: Rc<MockWalletProvider>,
    config: ControllerConfig,
) -> WalletController {
    let controller = WalletController::new(config, Rc::new(TokioScheduler::new()))
        .expect("default config is valid");
    let state = controller.connect(&MockDiscovery::found(mock)).await;
    assert_eq!(state, SessionState::Connected);
    controller.autopay().set_enabled(true);
    controller
}

/// A mock whose calls sleep on the tokio clock when latencies are queued.
pub fn timed_mock() -> MockWalletProvider {
    MockWalletProvider::new().with_scheduler(Rc::new(TokioScheduler::new()))
}

/// Advance the paused clock, letting spawned tasks run.
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}
