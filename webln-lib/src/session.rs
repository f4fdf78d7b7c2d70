//! Wallet provider acquisition.
//!
//! A session discovers the injected wallet once and then stays in whatever
//! state that produced. There is no reconnection: a page reload starts a
//! fresh session.

use crate::provider::{ProviderDiscovery, WalletProvider};
use crate::WeblnError;
use std::cell::RefCell;
use std::rc::Rc;

/// Message surfaced when no wallet could be acquired.
pub const PROVIDER_NOT_FOUND: &str =
    "WebLN provider not found. Please install Alby or another WebLN compatible wallet.";

/// Connection state of a [`ProviderSession`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Discovery has not run yet.
    Uninitialized,
    /// A provider handle is held.
    Connected,
    /// Discovery failed; terminal for this session.
    Unavailable {
        /// Human-readable cause.
        cause: String,
    },
}

enum Slot {
    Uninitialized,
    Discovering,
    Connected(Rc<dyn WalletProvider>),
    Unavailable(String),
}

/// Owner of the wallet capability handle.
pub struct ProviderSession {
    slot: RefCell<Slot>,
}

impl Default for ProviderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSession {
    /// Create a session that has not yet attempted discovery.
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(Slot::Uninitialized),
        }
    }

    /// Run discovery once.
    ///
    /// The first call decides the session's fate. Later calls return the
    /// stored state without touching `discovery` again.
    pub async fn acquire(&self, discovery: &dyn ProviderDiscovery) -> SessionState {
        {
            let mut slot = self.slot.borrow_mut();
            if !matches!(*slot, Slot::Uninitialized) {
                tracing::debug!("provider discovery already ran; keeping session state");
                drop(slot);
                return self.state();
            }
            *slot = Slot::Discovering;
        }

        let outcome = discovery.request_provider().await;

        *self.slot.borrow_mut() = match outcome {
            Ok(provider) => {
                tracing::info!("wallet provider connected");
                Slot::Connected(provider)
            }
            Err(cause) => {
                tracing::warn!(%cause, "wallet provider unavailable");
                Slot::Unavailable(cause)
            }
        };
        self.state()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        match &*self.slot.borrow() {
            Slot::Uninitialized | Slot::Discovering => SessionState::Uninitialized,
            Slot::Connected(_) => SessionState::Connected,
            Slot::Unavailable(cause) => SessionState::Unavailable {
                cause: cause.clone(),
            },
        }
    }

    /// Whether a provider handle is held.
    pub fn is_connected(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Connected(_))
    }

    /// The provider handle, or `ProviderUnavailable` when not connected.
    pub fn provider(&self) -> Result<Rc<dyn WalletProvider>, WeblnError> {
        match &*self.slot.borrow() {
            Slot::Connected(provider) => Ok(Rc::clone(provider)),
            Slot::Uninitialized | Slot::Discovering => Err(WeblnError::ProviderUnavailable(
                "wallet discovery has not completed".to_string(),
            )),
            Slot::Unavailable(cause) => Err(WeblnError::ProviderUnavailable(cause.clone())),
        }
    }
}
